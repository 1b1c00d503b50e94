//! Sequential, timed execution of a benchmark grid.
//!
//! The runner is deliberately single-threaded: points are measured one at a
//! time and iterations never overlap, since overlapping trials would contend
//! for the CPU and memory the trial is trying to measure. All parallelism
//! lives inside the backend call under test.
//!
//! A failing iteration is excluded from the timing statistics; a failing
//! point is recorded and skipped past. The sweep always completes and always
//! produces a result for every point.

use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::backend::{BackendError, EngineRegistry, TrainingBackend, TuneOutcome, TuneRequest};
use crate::data::Dataset;
use crate::grid::{BenchmarkGrid, ParameterPoint};

// =============================================================================
// Verbosity
// =============================================================================

/// Progress output level for a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    #[default]
    Silent,
    /// One line per grid point on stdout.
    Progress,
}

// =============================================================================
// SweepConfig
// =============================================================================

/// Execution parameters for a sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Timed repetitions per grid point. Default: 3.
    pub iterations: usize,
    /// Pause before each iteration, letting the machine settle after the
    /// previous trial. Default: 3 s.
    pub cooldown: Duration,
    /// Per-call timeout. `None` means a hung engine call blocks the sweep
    /// indefinitely. Default: `None`.
    pub timeout: Option<Duration>,
    /// Seed for the resampling RNG. Fixing it makes the *sequence* of
    /// resampled datasets deterministic; timings never are. Default: 42.
    pub seed: u64,
    /// Progress logging. Default: `Silent`.
    pub verbosity: Verbosity,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            iterations: 3,
            cooldown: Duration::from_secs(3),
            timeout: None,
            seed: 42,
            verbosity: Verbosity::Silent,
        }
    }
}

// =============================================================================
// TrialResult
// =============================================================================

/// How a point's trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    /// Every requested iteration succeeded.
    Complete,
    /// Some iterations succeeded, some failed.
    Partial,
    /// No iteration succeeded.
    Failed,
}

/// Timing record for one grid point.
///
/// `elapsed` holds only successful iterations, in chronological order;
/// failed iterations leave their error string in `failures` instead of a
/// fabricated duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub elapsed: Vec<Duration>,
    /// Iterations that were requested, successful or not.
    pub requested: usize,
    pub failures: Vec<String>,
}

impl TrialResult {
    pub fn status(&self) -> TrialStatus {
        if self.elapsed.is_empty() {
            TrialStatus::Failed
        } else if self.elapsed.len() < self.requested {
            TrialStatus::Partial
        } else {
            TrialStatus::Complete
        }
    }

    pub fn min(&self) -> Option<Duration> {
        self.elapsed.iter().min().copied()
    }

    pub fn max(&self) -> Option<Duration> {
        self.elapsed.iter().max().copied()
    }

    /// Median elapsed time; the mean of the two middle values for even counts.
    pub fn median(&self) -> Option<Duration> {
        if self.elapsed.is_empty() {
            return None;
        }
        let mut sorted = self.elapsed.clone();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            Some(sorted[mid])
        } else {
            Some((sorted[mid - 1] + sorted[mid]) / 2)
        }
    }
}

// =============================================================================
// SweepRunner
// =============================================================================

/// Drives a full grid sweep against an engine registry.
pub struct SweepRunner<'a> {
    registry: &'a EngineRegistry,
    config: SweepConfig,
}

impl<'a> SweepRunner<'a> {
    pub fn new(registry: &'a EngineRegistry, config: SweepConfig) -> Self {
        Self { registry, config }
    }

    /// Measure every point of the grid, in order.
    ///
    /// Points whose engine is not registered, or whose every iteration fails,
    /// are recorded as failed rather than aborting the sweep.
    pub fn run(&self, grid: &BenchmarkGrid, base: &Dataset) -> Vec<(ParameterPoint, TrialResult)> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut results = Vec::with_capacity(grid.len());

        for (index, point) in grid.iter().enumerate() {
            if self.config.verbosity == Verbosity::Progress {
                print!(
                    "[{}/{}] {} rows={} resolution={} ... ",
                    index + 1,
                    grid.len(),
                    point.label(),
                    point.row_count,
                    point.grid_resolution
                );
                let _ = std::io::Write::flush(&mut std::io::stdout());
            }

            let trial = match self.registry.resolve(&point.engine) {
                Ok(backend) => self.run_point(&backend, point, base, &mut rng),
                Err(e) => TrialResult {
                    elapsed: Vec::new(),
                    requested: self.config.iterations,
                    failures: vec![e.to_string()],
                },
            };

            if self.config.verbosity == Verbosity::Progress {
                match trial.status() {
                    TrialStatus::Complete => {
                        println!("ok median={:.2?}", trial.median().unwrap_or_default())
                    }
                    TrialStatus::Partial => println!(
                        "partial ({}/{} iterations)",
                        trial.elapsed.len(),
                        trial.requested
                    ),
                    TrialStatus::Failed => {
                        println!("failed: {}", trial.failures.first().map_or("", String::as_str))
                    }
                }
            }

            results.push((point.clone(), trial));
        }

        results
    }

    /// Run the repeated timed iterations for a single point.
    ///
    /// Each iteration pauses for the cooldown, draws a fresh bootstrap
    /// resample of `row_count` rows, and times one blocking backend call.
    /// Failed iterations are not retried.
    pub fn run_point<R: Rng>(
        &self,
        backend: &Arc<dyn TrainingBackend>,
        point: &ParameterPoint,
        base: &Dataset,
        rng: &mut R,
    ) -> TrialResult {
        let mut elapsed = Vec::with_capacity(self.config.iterations);
        let mut failures = Vec::new();

        for _ in 0..self.config.iterations {
            if !self.config.cooldown.is_zero() {
                thread::sleep(self.config.cooldown);
            }

            let sample = base.sample_with_replacement(point.row_count, rng);
            let request = TuneRequest {
                dataset: sample,
                cv_folds: point.cv_folds,
                grid_resolution: point.grid_resolution,
                parallelism: point.parallelism(),
            };

            let started = Instant::now();
            match self.invoke(backend, request) {
                Ok(_) => elapsed.push(started.elapsed()),
                Err(e) => failures.push(e.to_string()),
            }
        }

        TrialResult { elapsed, requested: self.config.iterations, failures }
    }

    /// One blocking backend call, optionally bounded by the configured timeout.
    ///
    /// With a timeout the call runs on a detached thread; on expiry the
    /// iteration is marked failed but the abandoned call cannot be cancelled
    /// and keeps its thread until the process exits.
    fn invoke(
        &self,
        backend: &Arc<dyn TrainingBackend>,
        request: TuneRequest,
    ) -> Result<TuneOutcome, BackendError> {
        let Some(timeout) = self.config.timeout else {
            return backend.train_and_tune(request);
        };

        let backend = Arc::clone(backend);
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(backend.train_and_tune(request));
        });

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(BackendError::TimedOut(timeout)),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(BackendError::CallPanicked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(successes: &[u64], requested: usize, failures: usize) -> TrialResult {
        TrialResult {
            elapsed: successes.iter().map(|&ms| Duration::from_millis(ms)).collect(),
            requested,
            failures: (0..failures).map(|i| format!("failure {i}")).collect(),
        }
    }

    #[test]
    fn status_reflects_success_counts() {
        assert_eq!(trial(&[1, 2, 3], 3, 0).status(), TrialStatus::Complete);
        assert_eq!(trial(&[1, 2], 3, 1).status(), TrialStatus::Partial);
        assert_eq!(trial(&[], 3, 3).status(), TrialStatus::Failed);
    }

    #[test]
    fn median_odd_count_is_middle_value() {
        let t = trial(&[30, 10, 20], 3, 0);
        assert_eq!(t.min(), Some(Duration::from_millis(10)));
        assert_eq!(t.median(), Some(Duration::from_millis(20)));
        assert_eq!(t.max(), Some(Duration::from_millis(30)));
    }

    #[test]
    fn median_even_count_averages_middle_values() {
        let t = trial(&[40, 10, 20, 30], 4, 0);
        assert_eq!(t.median(), Some(Duration::from_millis(25)));
    }

    #[test]
    fn empty_trial_has_no_statistics() {
        let t = trial(&[], 3, 3);
        assert_eq!(t.min(), None);
        assert_eq!(t.median(), None);
        assert_eq!(t.max(), None);
    }
}
