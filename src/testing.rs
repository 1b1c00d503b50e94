//! Test and example support: synthetic data and a scripted backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use ndarray::{Array1, Array2};
use rand::prelude::*;

use crate::backend::{BackendError, TrainingBackend, TuneOutcome, TuneRequest};
use crate::data::Dataset;

/// Generate random dense features, uniform in `[min, max]`.
pub fn random_features(rows: usize, cols: usize, seed: u64, min: f32, max: f32) -> Array2<f32> {
    assert!(max >= min);
    let mut rng = StdRng::seed_from_u64(seed);
    let width = max - min;
    Array2::from_shape_fn((rows, cols), |_| min + rng.gen::<f32>() * width)
}

/// A regression dataset whose target is a linear model of the features plus
/// uniform noise.
pub fn synthetic_regression(rows: usize, cols: usize, seed: u64, noise_amplitude: f32) -> Dataset {
    let features = random_features(rows, cols, seed, -1.0, 1.0);
    let mut rng = StdRng::seed_from_u64(seed ^ 0x0BAD_5EED);

    let weights: Vec<f32> = (0..cols).map(|_| rng.gen::<f32>() * 2.0 - 1.0).collect();
    let bias: f32 = rng.gen::<f32>() * 0.5 - 0.25;

    let targets = Array1::from_shape_fn(rows, |r| {
        let mut y = bias;
        for c in 0..cols {
            y += features[[r, c]] * weights[c];
        }
        if noise_amplitude > 0.0 {
            y += (rng.gen::<f32>() * 2.0 - 1.0) * noise_amplitude;
        }
        y
    });

    Dataset::new(features, targets).expect("synthetic dataset is well-formed")
}

// =============================================================================
// MockBackend
// =============================================================================

/// A scripted [`TrainingBackend`] for exercising the sweep runner.
///
/// Calls are counted from 1 across the backend's lifetime; selected call
/// numbers can be scripted to fail, and a fixed delay stands in for training
/// time.
pub struct MockBackend {
    delay: Duration,
    fail_on: Vec<usize>,
    calls: AtomicUsize,
}

impl MockBackend {
    /// A backend that succeeds immediately on every call.
    pub fn instant() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    /// A backend that sleeps `delay` before succeeding.
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay, fail_on: Vec::new(), calls: AtomicUsize::new(0) }
    }

    /// Script the given 1-based call numbers to fail.
    pub fn failing_on(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.fail_on = calls.into_iter().collect();
        self
    }

    /// Total calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TrainingBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn train_and_tune(&self, request: TuneRequest) -> Result<TuneOutcome, BackendError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        if self.fail_on.contains(&call) {
            return Err(BackendError::Engine(format!("injected failure on call {call}")));
        }
        Ok(TuneOutcome {
            best_metric: 0.0,
            models_trained: (request.grid_resolution as u64).pow(2) * request.cv_folds as u64,
        })
    }
}
