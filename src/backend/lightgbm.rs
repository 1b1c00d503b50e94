//! LightGBM engine adapter (`engine-lightgbm` feature).

use serde_json::json;

use super::tuning::{rmse, run_grid_search, Candidate, N_TREES};
use super::{BackendError, TrainingBackend, TuneOutcome, TuneRequest};
use crate::data::Dataset;

/// Tunes via the `lightgbm3` bindings, depth-limited trees.
#[derive(Debug, Default)]
pub struct LightGbmBackend;

impl TrainingBackend for LightGbmBackend {
    fn name(&self) -> &str {
        "lightgbm"
    }

    fn train_and_tune(&self, request: TuneRequest) -> Result<TuneOutcome, BackendError> {
        run_grid_search(&request, fit_and_score)
    }
}

fn engine_err(e: impl std::fmt::Display) -> BackendError {
    BackendError::Engine(e.to_string())
}

fn fit_and_score(
    train: &Dataset,
    valid: &Dataset,
    candidate: Candidate,
    threads: usize,
) -> Result<f64, BackendError> {
    let train_features: Vec<f64> = train.features_row_major().iter().map(|&x| x as f64).collect();
    let valid_features: Vec<f64> = valid.features_row_major().iter().map(|&x| x as f64).collect();
    let n_leaves = (1u64.checked_shl(candidate.max_depth).unwrap_or(u64::MAX)).max(2) as i64;

    let params = json!({
        "objective": "regression",
        "metric": "l2",
        "num_iterations": N_TREES as i64,
        "learning_rate": candidate.learning_rate as f64,
        "max_depth": candidate.max_depth as i64,
        "num_leaves": n_leaves,
        "max_bin": 256,
        "min_data_in_leaf": 1,
        "lambda_l2": 1.0,
        "feature_fraction": 1.0,
        "bagging_fraction": 1.0,
        "bagging_freq": 0,
        "verbosity": -1,
        "num_threads": threads as i64,
    });

    let dataset = lightgbm3::Dataset::from_slice(
        &train_features,
        &train.targets_vec(),
        train.n_cols() as i32,
        true,
    )
    .map_err(engine_err)?;
    let booster = lightgbm3::Booster::train(dataset, &params).map_err(engine_err)?;
    let predictions = booster
        .predict(&valid_features, valid.n_cols() as i32, true)
        .map_err(engine_err)?;

    let predictions_f32: Vec<f32> = predictions.into_iter().map(|x| x as f32).collect();
    Ok(rmse(&predictions_f32, &valid.targets_vec()))
}
