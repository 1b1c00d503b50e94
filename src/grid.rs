//! Benchmark grid construction.
//!
//! A sweep is defined by a [`GridConfig`]: the candidate dataset sizes,
//! tuning-grid resolutions, and thread counts, plus a fixed parallelism budget
//! to split between engine threads and tuning workers. [`BenchmarkGrid::build`]
//! expands the config into an ordered list of [`ParameterPoint`]s: the full
//! cartesian product with `workers = budget / threads`, followed by one
//! single-thread single-worker baseline per (row_count, resolution) pair.
//!
//! All configuration errors are caught here, before any trial runs. Notably a
//! thread count above the budget would derive zero workers, which is a
//! meaningless point to measure and is rejected outright.

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::parallel::ParallelismConfig;

// =============================================================================
// GridError
// =============================================================================

/// Errors from grid configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("{axis} must not be empty")]
    EmptyAxis { axis: &'static str },

    #[error("row counts must be at least 1")]
    InvalidRowCount,

    #[error("tuning grid resolutions must be at least 1")]
    InvalidResolution,

    #[error("cv_folds must be at least 2, got {0}")]
    InvalidCvFolds(u32),

    #[error("parallelism budget must be at least 1, got {0}")]
    InvalidBudget(usize),

    #[error("thread options must be at least 1")]
    InvalidThreads,

    #[error(
        "thread count {threads} exceeds the parallelism budget {budget}; \
         the derived worker count would be zero"
    )]
    ZeroWorkers { threads: usize, budget: usize },
}

// =============================================================================
// ParameterPoint
// =============================================================================

/// One fully-specified combination of benchmark parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterPoint {
    /// Engine name resolved through the registry at run time.
    pub engine: String,
    /// Cross-validation fold count.
    pub cv_folds: u32,
    /// Candidate values explored per tuned hyperparameter.
    pub grid_resolution: u32,
    /// Rows resampled from the base dataset for each trial.
    pub row_count: usize,
    /// Thread count passed to the engine's own thread knob.
    pub threads: usize,
    /// Worker count dispatching candidate-by-fold tuning jobs.
    pub workers: usize,
}

impl ParameterPoint {
    /// The two parallelism knobs as an explicit per-call parameter.
    pub fn parallelism(&self) -> ParallelismConfig {
        ParallelismConfig::new(self.threads, self.workers)
    }

    /// Short series label, e.g. `8t/1w`.
    pub fn label(&self) -> String {
        format!("{}t/{}w", self.threads, self.workers)
    }
}

// =============================================================================
// GridConfig
// =============================================================================

/// Configuration for a benchmark grid.
///
/// The builder's `build()` validates; invalid axes fail fast before any trial
/// executes.
///
/// # Example
///
/// ```
/// use boostbench::GridConfig;
///
/// let config = GridConfig::builder()
///     .engine("xgboost")
///     .row_counts(vec![1_000, 100_000])
///     .grid_resolutions(vec![3, 5])
///     .thread_options(vec![1, 2, 4, 8])
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct GridConfig {
    /// Engine name, e.g. `"xgboost"` or `"lightgbm"`.
    #[builder(into)]
    pub engine: String,

    /// Dataset row counts to benchmark.
    pub row_counts: Vec<usize>,

    /// Tuning-grid resolutions to benchmark.
    pub grid_resolutions: Vec<u32>,

    /// Engine thread counts to benchmark. Worker counts are derived from the
    /// budget, not listed explicitly.
    pub thread_options: Vec<usize>,

    /// Total parallelism to split between threads and workers. Default: 8.
    ///
    /// Match this to the machine's hardware parallelism; `threads * workers`
    /// never exceeds it for budget-derived points.
    #[builder(default = 8)]
    pub parallelism_budget: usize,

    /// Cross-validation fold count. Default: 8.
    #[builder(default = 8)]
    pub cv_folds: u32,
}

/// Custom finishing function that validates the config.
impl<S: grid_config_builder::IsComplete> GridConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if any axis is empty, `cv_folds < 2`, the budget
    /// is zero, or a thread option exceeds the budget.
    pub fn build(self) -> Result<GridConfig, GridError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl GridConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.row_counts.is_empty() {
            return Err(GridError::EmptyAxis { axis: "row_counts" });
        }
        if self.grid_resolutions.is_empty() {
            return Err(GridError::EmptyAxis { axis: "grid_resolutions" });
        }
        if self.thread_options.is_empty() {
            return Err(GridError::EmptyAxis { axis: "thread_options" });
        }
        if self.row_counts.iter().any(|&r| r == 0) {
            return Err(GridError::InvalidRowCount);
        }
        if self.grid_resolutions.iter().any(|&r| r == 0) {
            return Err(GridError::InvalidResolution);
        }
        if self.cv_folds < 2 {
            return Err(GridError::InvalidCvFolds(self.cv_folds));
        }
        if self.parallelism_budget == 0 {
            return Err(GridError::InvalidBudget(self.parallelism_budget));
        }
        for &threads in &self.thread_options {
            if threads == 0 {
                return Err(GridError::InvalidThreads);
            }
            if threads > self.parallelism_budget {
                return Err(GridError::ZeroWorkers {
                    threads,
                    budget: self.parallelism_budget,
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// BenchmarkGrid
// =============================================================================

/// An ordered sequence of [`ParameterPoint`]s to measure.
///
/// Budget-derived points come first, in axis order; the single-thread
/// single-worker baselines are appended after. Duplicates are permitted and
/// simply re-measured.
#[derive(Debug, Clone)]
pub struct BenchmarkGrid {
    points: Vec<ParameterPoint>,
}

impl BenchmarkGrid {
    /// Expand a validated config into the full point list.
    pub fn build(config: &GridConfig) -> Result<Self, GridError> {
        config.validate()?;

        let mut points = Vec::with_capacity(
            config.row_counts.len()
                * config.grid_resolutions.len()
                * (config.thread_options.len() + 1),
        );

        for &row_count in &config.row_counts {
            for &grid_resolution in &config.grid_resolutions {
                for &threads in &config.thread_options {
                    points.push(ParameterPoint {
                        engine: config.engine.clone(),
                        cv_folds: config.cv_folds,
                        grid_resolution,
                        row_count,
                        threads,
                        workers: config.parallelism_budget / threads,
                    });
                }
            }
        }

        // Control case outside the budget-derived enumeration.
        for &row_count in &config.row_counts {
            for &grid_resolution in &config.grid_resolutions {
                points.push(ParameterPoint {
                    engine: config.engine.clone(),
                    cv_folds: config.cv_folds,
                    grid_resolution,
                    row_count,
                    threads: 1,
                    workers: 1,
                });
            }
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[ParameterPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterPoint> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a BenchmarkGrid {
    type Item = &'a ParameterPoint;
    type IntoIter = std::slice::Iter<'a, ParameterPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
