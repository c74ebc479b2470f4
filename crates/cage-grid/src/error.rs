//! Error types for grid construction.

use glam::IVec3;
use std::fmt;

/// Errors arising from grid construction, relocation or resizing.
#[derive(Clone, Debug, PartialEq)]
pub enum GridError {
    /// The cell size is zero, negative, or not finite.
    InvalidCellSize {
        /// The rejected value.
        value: f32,
    },
    /// At least one axis has no cells.
    EmptyGrid {
        /// The rejected dimensions.
        size: IVec3,
    },
    /// The total cell count does not fit the index width.
    CellCountOverflow {
        /// The requested number of cells.
        cells: i64,
        /// The largest number of cells supported.
        max: i64,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellSize { value } => {
                write!(f, "cell size must be finite and positive, got {value}")
            }
            Self::EmptyGrid { size } => {
                write!(f, "grid must have at least one cell per axis, got {size}")
            }
            Self::CellCountOverflow { cells, max } => {
                write!(f, "grid has {cells} cells, at most {max} are supported")
            }
        }
    }
}

impl std::error::Error for GridError {}
