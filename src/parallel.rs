//! Parallelism plumbing for the subject under test.
//!
//! The harness itself is strictly sequential. These helpers exist so engine
//! adapters can honor the two knobs a [`crate::ParameterPoint`] sets: the
//! engine thread count, and the worker count used to dispatch tuning jobs.

use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

/// The two parallelism knobs of one tuning call.
///
/// Passed explicitly with every [`crate::TuneRequest`] rather than registered
/// as process-wide state, so calls cannot observe each other's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelismConfig {
    /// Threads for a single model fit, forwarded to the engine.
    pub threads: usize,
    /// Workers dispatching candidate-by-fold tuning jobs.
    pub workers: usize,
}

impl ParallelismConfig {
    pub fn new(threads: usize, workers: usize) -> Self {
        Self { threads, workers }
    }

    /// Total CPU oversubscription of the call: `threads * workers`.
    pub fn total(&self) -> usize {
        self.threads * self.workers
    }
}

/// Run `f` within a rayon thread pool of `workers` threads.
///
/// Uses a *local* pool so different grid points can use different worker
/// counts without touching the global pool.
pub fn with_worker_pool<R: Send>(workers: usize, f: impl FnOnce() -> R + Send) -> R {
    if workers == 0 {
        panic!("workers must be >= 1");
    }

    if workers == 1 {
        // Avoid pool overhead for the 1-worker case.
        return f();
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .expect("failed to build rayon thread pool");
    pool.install(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_threads_times_workers() {
        assert_eq!(ParallelismConfig::new(2, 4).total(), 8);
        assert_eq!(ParallelismConfig::new(1, 1).total(), 1);
    }

    #[test]
    fn worker_pool_sizes_rayon() {
        assert_eq!(with_worker_pool(3, rayon::current_num_threads), 3);
    }

    #[test]
    fn single_worker_runs_inline() {
        let before = rayon::current_num_threads();
        assert_eq!(with_worker_pool(1, rayon::current_num_threads), before);
    }

    #[test]
    #[should_panic(expected = "workers must be >= 1")]
    fn zero_workers_panic() {
        with_worker_pool(0, || ());
    }
}
