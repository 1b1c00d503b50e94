//! boostbench: a benchmark harness for parallel gradient-boosted-tree tuning.
//!
//! Tuning a boosted-tree model parallelizes along two independent axes: the
//! engine's own thread count, and the number of workers dispatching
//! candidate-by-fold jobs. This crate measures how a fixed parallelism budget
//! should be split between the two, across dataset sizes and tuning-grid
//! resolutions.
//!
//! # Key Types
//!
//! - [`GridConfig`] / [`BenchmarkGrid`] - Enumerate the parameter points to measure
//! - [`TrainingBackend`] / [`EngineRegistry`] - The opaque tuning call under test
//! - [`SweepRunner`] / [`SweepConfig`] - Timed, sequential execution of the grid
//! - [`Report`] / [`summarize`] - Aggregation, persistence, and rendering
//!
//! # Running a sweep
//!
//! Build a [`GridConfig`] with `GridConfig::builder()`, expand it with
//! [`BenchmarkGrid::build`], then hand the grid and a base [`Dataset`] to a
//! [`SweepRunner`]. The runner measures each point one at a time and never
//! aborts on a failing point; [`summarize`] turns the raw trials into a
//! serializable [`Report`].
//!
//! Engine adapters for XGBoost and LightGBM are behind the `engine-xgboost`
//! and `engine-lightgbm` features since both link native libraries.

pub mod backend;
pub mod data;
pub mod grid;
pub mod parallel;
pub mod report;
pub mod runner;
pub mod testing;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use backend::{BackendError, EngineRegistry, TrainingBackend, TuneOutcome, TuneRequest};
pub use data::Dataset;
pub use grid::{BenchmarkGrid, GridConfig, GridError, ParameterPoint};
pub use parallel::{with_worker_pool, ParallelismConfig};
pub use report::{summarize, Report, ReportError, ReportRow};
pub use runner::{SweepConfig, SweepRunner, TrialResult, TrialStatus, Verbosity};
