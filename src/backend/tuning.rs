//! Shared grid-search scaffold for engine adapters.
//!
//! Every adapter tunes the same two hyperparameters (learning rate, max
//! depth) over a regular `resolution x resolution` candidate grid with k-fold
//! cross-validation. The adapter contributes only a fit-and-score closure;
//! the scaffold owns fold splitting, worker dispatch, and mean-score
//! aggregation. Candidate-by-fold jobs fan out across the request's worker
//! count, while the engine thread count is forwarded into each fit.

use rayon::prelude::*;

use super::{BackendError, TuneOutcome, TuneRequest};
use crate::data::Dataset;
use crate::parallel::with_worker_pool;

/// Hyperparameters the candidate grid varies. Keep in sync with
/// [`Candidate::grid`].
pub const TUNED_PARAMS: u32 = 2;

/// Boosting rounds per model fit. Fixed so elapsed time varies only with the
/// grid axes under study.
pub const N_TREES: u32 = 50;

// =============================================================================
// Candidate grid
// =============================================================================

/// One hyperparameter combination to cross-validate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub learning_rate: f32,
    pub max_depth: u32,
}

impl Candidate {
    /// Regular grid of `resolution^2` candidates.
    ///
    /// Learning rate spans `[0.05, 0.30]`, max depth counts up from 3.
    pub fn grid(resolution: u32) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity((resolution * resolution) as usize);
        for d in 0..resolution {
            let max_depth = 3 + d;
            for l in 0..resolution {
                let learning_rate = if resolution == 1 {
                    0.1
                } else {
                    0.05 + 0.25 * l as f32 / (resolution - 1) as f32
                };
                candidates.push(Candidate { learning_rate, max_depth });
            }
        }
        candidates
    }
}

// =============================================================================
// Fold splitting
// =============================================================================

/// Split a dataset into `folds` round-robin (train, validation) pairs.
///
/// Row `r` validates in fold `r % folds`. Deterministic by construction, so
/// resampling is the only source of randomness in a trial.
pub fn fold_splits(dataset: &Dataset, folds: u32) -> Result<Vec<(Dataset, Dataset)>, BackendError> {
    let k = folds as usize;
    if k < 2 {
        return Err(BackendError::Engine(format!(
            "cross-validation needs at least 2 folds, got {k}"
        )));
    }
    let rows = dataset.n_rows();
    if rows < k {
        return Err(BackendError::Engine(format!(
            "cannot split {rows} rows into {k} cross-validation folds"
        )));
    }

    let mut splits = Vec::with_capacity(k);
    for fold in 0..k {
        let valid: Vec<usize> = (fold..rows).step_by(k).collect();
        let train: Vec<usize> = (0..rows).filter(|r| r % k != fold).collect();
        splits.push((dataset.select_rows(&train), dataset.select_rows(&valid)));
    }
    Ok(splits)
}

// =============================================================================
// Grid search
// =============================================================================

/// Run the full candidate-by-fold grid search for one request.
///
/// `fit_and_score` trains one model on the train split with the given
/// candidate and engine thread count, and returns the validation RMSE. Jobs
/// run across the request's workers in a local pool; any single failing fit
/// fails the whole call.
pub fn run_grid_search<F>(request: &TuneRequest, fit_and_score: F) -> Result<TuneOutcome, BackendError>
where
    F: Fn(&Dataset, &Dataset, Candidate, usize) -> Result<f64, BackendError> + Sync,
{
    let folds = fold_splits(&request.dataset, request.cv_folds)?;
    let candidates = Candidate::grid(request.grid_resolution);
    let threads = request.parallelism.threads;

    let jobs: Vec<(usize, usize)> = (0..candidates.len())
        .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
        .collect();

    let run_job = |&(c, f): &(usize, usize)| {
        let (train, valid) = &folds[f];
        fit_and_score(train, valid, candidates[c], threads)
    };

    let workers = request.parallelism.workers;
    let scores: Vec<f64> = if workers == 1 {
        jobs.iter().map(run_job).collect::<Result<_, _>>()?
    } else {
        with_worker_pool(workers, || {
            jobs.par_iter().map(run_job).collect::<Result<_, _>>()
        })?
    };

    let per_candidate = folds.len();
    let best_metric = scores
        .chunks_exact(per_candidate)
        .map(|fold_scores| fold_scores.iter().sum::<f64>() / per_candidate as f64)
        .fold(f64::INFINITY, f64::min);

    Ok(TuneOutcome {
        best_metric,
        models_trained: (candidates.len() * per_candidate) as u64,
    })
}

/// Root mean squared error between predictions and targets.
pub fn rmse(predictions: &[f32], targets: &[f32]) -> f64 {
    debug_assert_eq!(predictions.len(), targets.len());
    let n = targets.len().max(1);
    let sum_sq: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(&p, &t)| {
            let d = (p - t) as f64;
            d * d
        })
        .sum();
    (sum_sq / n as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::ParallelismConfig;
    use crate::testing::synthetic_regression;
    use approx::assert_relative_eq;

    fn request(rows: usize, folds: u32, resolution: u32, workers: usize) -> TuneRequest {
        TuneRequest {
            dataset: synthetic_regression(rows, 4, 42, 0.1),
            cv_folds: folds,
            grid_resolution: resolution,
            parallelism: ParallelismConfig::new(1, workers),
        }
    }

    #[test]
    fn candidate_grid_is_resolution_squared() {
        assert_eq!(Candidate::grid(1).len(), 1);
        assert_eq!(Candidate::grid(3).len(), 9);
        let grid = Candidate::grid(2);
        assert_relative_eq!(grid[0].learning_rate, 0.05);
        assert_relative_eq!(grid[1].learning_rate, 0.30);
        assert_eq!(grid[3].max_depth, 4);
    }

    #[test]
    fn fold_splits_partition_every_row_once() {
        let dataset = synthetic_regression(17, 3, 7, 0.0);
        let splits = fold_splits(&dataset, 4).unwrap();
        assert_eq!(splits.len(), 4);
        let valid_total: usize = splits.iter().map(|(_, v)| v.n_rows()).sum();
        assert_eq!(valid_total, 17);
        for (train, valid) in &splits {
            assert_eq!(train.n_rows() + valid.n_rows(), 17);
        }
    }

    #[test]
    fn fold_splits_reject_more_folds_than_rows() {
        let dataset = synthetic_regression(3, 2, 7, 0.0);
        let err = fold_splits(&dataset, 8).unwrap_err();
        assert!(matches!(err, BackendError::Engine(_)));
    }

    #[test]
    fn grid_search_counts_models_and_picks_best_mean() {
        // Score encodes the candidate's learning rate so the best mean is the
        // smallest learning rate.
        let outcome = run_grid_search(&request(40, 4, 3, 1), |_, _, candidate, _| {
            Ok(candidate.learning_rate as f64)
        })
        .unwrap();
        assert_eq!(outcome.models_trained, 9 * 4);
        assert_relative_eq!(outcome.best_metric, 0.05, epsilon = 1e-6);
    }

    #[test]
    fn grid_search_dispatches_across_workers() {
        let outcome = run_grid_search(&request(40, 4, 2, 4), |train, valid, _, threads| {
            assert_eq!(threads, 1);
            assert_eq!(train.n_rows() + valid.n_rows(), 40);
            Ok(1.0)
        })
        .unwrap();
        assert_eq!(outcome.models_trained, 16);
    }

    #[test]
    fn grid_search_propagates_fit_failure() {
        let err = run_grid_search(&request(40, 4, 2, 1), |_, _, _, _| {
            Err(BackendError::Engine("out of memory".into()))
        })
        .unwrap_err();
        assert_eq!(err, BackendError::Engine("out of memory".into()));
    }

    #[test]
    fn rmse_basic() {
        assert_relative_eq!(rmse(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
        assert_relative_eq!(rmse(&[0.0, 0.0], &[3.0, 4.0]), (12.5f64).sqrt());
    }
}
