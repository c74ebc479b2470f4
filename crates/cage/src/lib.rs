//! Cage: broad-phase overlap detection and separation for sphere agents.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all cage sub-crates. For most users, adding `cage` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use cage::prelude::*;
//!
//! let mut cage = BubbleCage::new(CageConfig {
//!     cell_size: 2.0,
//!     size: IVec3::splat(4),
//!     bounds: BoundsSource::Centered(Vec3::ZERO),
//!     threads_count: Some(2),
//!     repopulate_after_decouple: true,
//! })
//! .unwrap();
//!
//! let mut agents = AgentArena::new();
//! let a = agents.spawn(Vec3::ZERO, Some(Sphere::new(1.0))).unwrap();
//! let b = agents.spawn(Vec3::new(0.5, 0.0, 0.0), Some(Sphere::new(1.0))).unwrap();
//! let far = agents.spawn(Vec3::new(1000.0, 0.0, 0.0), Some(Sphere::new(1.0))).unwrap();
//!
//! let report = cage.evaluate(&mut agents);
//! assert_eq!(report.populate.despawned, vec![far]);
//!
//! let gap = agents.position_of(a).unwrap().distance(agents.position_of(b).unwrap());
//! assert!((gap - 2.0).abs() < 1e-4);
//! assert!(cage.get_overlapping(Vec3::splat(10.0), 0.1, &agents).is_empty());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cage-core` | Handles, spheres, fingerprints, worker pool, store traits |
//! | [`grid`] | `cage-grid` | Cells, the grid, neighbourhood queries |
//! | [`arena`] | `cage-arena` | Generational agent arena |
//! | [`engine`] | `cage-engine` | Populate/decouple passes and the evaluator |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`cage-core`).
///
/// Implement [`types::AgentStore`] to run the cage against your own agent
/// storage.
pub use cage_core as types;

/// Uniform grid, cells and queries (`cage-grid`).
pub use cage_grid as grid;

/// Generational agent arena (`cage-arena`).
///
/// [`arena::AgentArena`] is a ready-made [`types::AgentStore`].
pub use cage_arena as arena;

/// Passes and the evaluator (`cage-engine`).
///
/// [`engine::BubbleCage`] runs the full cycle; [`engine::populate`] and
/// [`engine::decouple`] expose the individual passes.
pub use cage_engine as engine;

/// Common imports for typical cage usage.
pub mod prelude {
    // Core types and traits
    pub use cage_core::{
        AgentId, AgentLookup, AgentStore, Body, BodyMut, Decoupling, Filter, Fingerprint, IVec3,
        Sphere, Vec3, WorkerPool,
    };

    // Grid
    pub use cage_grid::{BoundsSource, Grid};

    // Arena
    pub use cage_arena::{AgentArena, ArenaError};

    // Engine
    pub use cage_engine::{
        BubbleCage, CageConfig, ConfigError, DecoupleReport, EvaluateReport, PopulateReport,
    };
}
