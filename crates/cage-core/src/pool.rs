//! Fixed-size worker pool for data-parallel passes.
//!
//! Each [`WorkerPool`] owns its own rayon thread pool, so the worker count is
//! a property of the pool handed to a pass rather than a process-wide
//! setting. Passes fan out over agents inside [`WorkerPool::install`] and the
//! call returns only once every task has finished, which is the barrier the
//! cage passes rely on.

use std::fmt;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::PoolError;

/// A fixed number of worker threads.
pub struct WorkerPool {
    pool: ThreadPool,
    threads: usize,
}

impl WorkerPool {
    /// Spawn a pool with exactly `threads` workers.
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        if threads == 0 {
            return Err(PoolError::NoThreads);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("cage-worker-{i}"))
            .build()
            .map_err(|e| PoolError::SpawnFailed {
                reason: e.to_string(),
            })?;
        Ok(Self { pool, threads })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `op` inside the pool; parallel iterators used by `op` are
    /// scheduled on this pool's workers only.
    pub fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn zero_threads_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(PoolError::NoThreads)));
    }

    #[test]
    fn install_runs_on_pool_threads() {
        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.threads(), 3);
        assert_eq!(pool.install(rayon::current_num_threads), 3);
        let sum: u64 = pool.install(|| (0..1000u64).into_par_iter().sum());
        assert_eq!(sum, 499_500);
    }
}
