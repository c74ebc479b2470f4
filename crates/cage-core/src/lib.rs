//! Core types and traits for the bubble cage.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! agent handle, the per-agent value types read and written by the cage
//! passes, tag fingerprints, the axis-aligned box, the worker pool, and the
//! [`AgentStore`] trait through which the cage talks to whatever owns the
//! agents.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod error;
pub mod fingerprint;
pub mod id;
pub mod math;
pub mod pool;
pub mod traits;

pub use agent::{Body, BodyMut, Decoupling, Sphere};
pub use error::PoolError;
pub use fingerprint::{Filter, Fingerprint};
pub use glam::{IVec3, Vec3};
pub use id::AgentId;
pub use math::Aabb;
pub use pool::WorkerPool;
pub use traits::{AgentLookup, AgentStore};
