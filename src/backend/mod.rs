//! The training backend abstraction.
//!
//! A [`TrainingBackend`] is the opaque subject under test: one blocking call
//! that tunes a boosted-tree model over a hyperparameter grid with k-fold
//! cross-validation. The harness never inspects model internals; it only
//! times the call's completion and forwards the two parallelism knobs.
//!
//! Engines are resolved by name through an [`EngineRegistry`], so a grid can
//! reference `"xgboost"` or `"lightgbm"` without the harness depending on
//! either adapter.

pub mod tuning;

#[cfg(feature = "engine-lightgbm")]
pub mod lightgbm;
#[cfg(feature = "engine-xgboost")]
pub mod xgboost;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::data::Dataset;
use crate::parallel::ParallelismConfig;

// =============================================================================
// Request / Outcome
// =============================================================================

/// One tuning call. Owns its dataset: every trial iteration works on a fresh
/// bootstrap resample, never on shared state.
#[derive(Debug)]
pub struct TuneRequest {
    pub dataset: Dataset,
    /// Cross-validation fold count.
    pub cv_folds: u32,
    /// Candidate values per tuned hyperparameter.
    pub grid_resolution: u32,
    /// Explicit per-call parallelism, never ambient process state.
    pub parallelism: ParallelismConfig,
}

/// What a completed tuning call reports back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuneOutcome {
    /// Best cross-validated validation metric (RMSE) over the candidate grid.
    pub best_metric: f64,
    /// Model fits the call performed: candidates x folds.
    pub models_trained: u64,
}

// =============================================================================
// BackendError
// =============================================================================

/// Errors from a tuning call or engine resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    #[error("engine failure: {0}")]
    Engine(String),

    #[error("tuning call exceeded the {0:?} timeout")]
    TimedOut(Duration),

    #[error("tuning call panicked")]
    CallPanicked,
}

// =============================================================================
// TrainingBackend
// =============================================================================

/// A synchronous, blocking tuning capability for one engine.
///
/// Implementations must be shareable across threads: the sweep runner moves
/// calls onto a helper thread when a timeout is configured.
pub trait TrainingBackend: Send + Sync {
    /// Engine name this backend answers to in the registry.
    fn name(&self) -> &str;

    /// Train and tune over the request's candidate grid, blocking until done.
    fn train_and_tune(&self, request: TuneRequest) -> Result<TuneOutcome, BackendError>;
}

// =============================================================================
// EngineRegistry
// =============================================================================

/// Dynamic dispatch over engine names.
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn TrainingBackend>>,
}

impl EngineRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self { engines: HashMap::new() }
    }

    /// A registry holding every compiled-in engine adapter.
    pub fn with_builtin_engines() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "engine-xgboost")]
        registry.register(Arc::new(xgboost::XgboostBackend::default()));
        #[cfg(feature = "engine-lightgbm")]
        registry.register(Arc::new(lightgbm::LightGbmBackend::default()));
        registry
    }

    /// Register a backend under its own name, replacing any previous one.
    pub fn register(&mut self, backend: Arc<dyn TrainingBackend>) {
        self.engines.insert(backend.name().to_string(), backend);
    }

    /// Look an engine up by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn TrainingBackend>, BackendError> {
        self.engines
            .get(name)
            .cloned()
            .ok_or_else(|| BackendError::UnknownEngine(name.to_string()))
    }

    /// Registered engine names, sorted.
    pub fn engine_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.engines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::with_builtin_engines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;

    #[test]
    fn resolve_unknown_engine_fails() {
        let registry = EngineRegistry::new();
        let err = registry.resolve("catboost").err().unwrap();
        assert_eq!(err, BackendError::UnknownEngine("catboost".to_string()));
    }

    #[test]
    fn register_and_resolve_by_name() {
        let mut registry = EngineRegistry::new();
        registry.register(Arc::new(MockBackend::instant()));
        assert_eq!(registry.engine_names(), vec!["mock"]);
        assert_eq!(registry.resolve("mock").unwrap().name(), "mock");
    }
}
