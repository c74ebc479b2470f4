//! Uniform spatial grid for the bubble cage.
//!
//! A [`Grid`] partitions an axis-aligned world box into equally sized cubic
//! [`Cell`]s. Each cell buckets the agents whose centres fall inside it for
//! the current frame. Cells are filled concurrently by many workers, each
//! holding only that cell's lock, and cleared incrementally through the
//! occupied-cells worklist.
//!
//! # Coordinate mapping
//!
//! - [`Grid::world_to_cell`] floors, never clamps.
//! - [`Grid::cell_index`] clamps each axis into range before flattening.
//! - [`Grid::is_inside`] is the exact containment check.
//!
//! Callers that need strict containment must test [`Grid::is_inside`]
//! before trusting an index.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod error;
pub mod grid;
pub mod query;

pub use cell::{Cell, CellSlot};
pub use error::GridError;
pub use grid::{BoundsSource, Grid};
