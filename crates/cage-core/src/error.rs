//! Error types shared by the cage crates.

use std::error::Error;
use std::fmt;

/// Errors arising from building a [`WorkerPool`](crate::WorkerPool).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// Zero threads were requested.
    NoThreads,
    /// The underlying thread pool could not be spawned.
    SpawnFailed {
        /// Description reported by the thread pool builder.
        reason: String,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoThreads => write!(f, "worker pool needs at least one thread"),
            Self::SpawnFailed { reason } => write!(f, "worker pool spawn failed: {reason}"),
        }
    }
}

impl Error for PoolError {}
