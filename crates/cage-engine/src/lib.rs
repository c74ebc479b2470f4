//! Populate, decouple and evaluate passes of the bubble cage.
//!
//! [`BubbleCage`] bundles a [`Grid`](cage_grid::Grid) with a
//! [`WorkerPool`](cage_core::WorkerPool) and runs the per-frame cycle
//! against any [`AgentStore`](cage_core::AgentStore):
//!
//! ```text
//! evaluate
//! ├── populate    clear last frame's cells, bucket agents, despawn strays
//! ├── decouple    scan ─▶ accumulate ─▶ resolve
//! └── populate    (optional) bring the grid in line with moved agents
//! ```
//!
//! The passes are also exposed as free functions in [`populate`] and
//! [`decouple`] taking the pool explicitly, for callers that want a
//! different worker count per invocation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cage;
pub mod config;
pub mod decouple;
pub mod metrics;
pub mod populate;

pub use cage::BubbleCage;
pub use config::{CageConfig, ConfigError};
pub use metrics::{DecoupleReport, EvaluateReport, PassMetrics, PopulateReport};
