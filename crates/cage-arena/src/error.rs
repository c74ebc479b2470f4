//! Arena error types.

use std::error::Error;
use std::fmt;

use cage_core::AgentId;

/// Errors from arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The handle's slot was freed or reused.
    StaleHandle {
        /// The offending handle.
        agent: AgentId,
    },
    /// Every `u32` slot index is taken.
    CapacityExceeded {
        /// Number of slots in use.
        slots: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleHandle { agent } => write!(f, "stale agent handle {agent}"),
            Self::CapacityExceeded { slots } => {
                write!(f, "arena capacity exceeded: {slots} slots in use")
            }
        }
    }
}

impl Error for ArenaError {}
