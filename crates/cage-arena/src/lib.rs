//! Generational agent storage for the bubble cage.
//!
//! [`AgentArena`] is a slot vector with per-slot generations and a free
//! list. Handles are [`AgentId`](cage_core::AgentId)s; a handle whose
//! generation no longer matches its slot is stale and resolves to nothing.
//!
//! The arena implements [`AgentStore`](cage_core::AgentStore), so it can be
//! handed straight to the cage passes: only agents that carry a sphere are
//! visited, per-agent closures fan out over the caller's
//! [`WorkerPool`](cage_core::WorkerPool), and despawn requests raised from
//! worker threads are queued until [`AgentArena::apply_deferreds`] runs.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod error;

pub use arena::{Agent, AgentArena};
pub use error::ArenaError;
