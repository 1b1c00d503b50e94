//! XGBoost engine adapter (`engine-xgboost` feature).

use xgb::parameters::tree::{GrowPolicy, TreeBoosterParametersBuilder, TreeMethod};
use xgb::parameters::{
    learning::LearningTaskParametersBuilder, learning::Objective, BoosterParametersBuilder,
    BoosterType, TrainingParametersBuilder,
};
use xgb::{Booster, DMatrix};

use super::tuning::{rmse, run_grid_search, Candidate, N_TREES};
use super::{BackendError, TrainingBackend, TuneOutcome, TuneRequest};
use crate::data::Dataset;

/// Tunes via the `xgb` bindings, hist tree method, depth-wise growth.
#[derive(Debug, Default)]
pub struct XgboostBackend;

impl TrainingBackend for XgboostBackend {
    fn name(&self) -> &str {
        "xgboost"
    }

    fn train_and_tune(&self, request: TuneRequest) -> Result<TuneOutcome, BackendError> {
        run_grid_search(&request, fit_and_score)
    }
}

fn engine_err(e: impl std::fmt::Display) -> BackendError {
    BackendError::Engine(e.to_string())
}

fn to_dmatrix(dataset: &Dataset) -> Result<DMatrix, BackendError> {
    let features = dataset.features_row_major();
    let mut matrix = DMatrix::from_dense(&features, dataset.n_rows()).map_err(engine_err)?;
    matrix
        .set_labels(&dataset.targets_vec())
        .map_err(engine_err)?;
    Ok(matrix)
}

fn fit_and_score(
    train: &Dataset,
    valid: &Dataset,
    candidate: Candidate,
    threads: usize,
) -> Result<f64, BackendError> {
    let tree_params = TreeBoosterParametersBuilder::default()
        .eta(candidate.learning_rate)
        .max_depth(candidate.max_depth)
        .grow_policy(GrowPolicy::Depthwise)
        .lambda(1.0)
        .alpha(0.0)
        .gamma(0.0)
        .min_child_weight(1.0)
        .tree_method(TreeMethod::Hist)
        .max_bin(256u32)
        .build()
        .map_err(engine_err)?;

    let learning_params = LearningTaskParametersBuilder::default()
        .objective(Objective::RegLinear)
        .build()
        .map_err(engine_err)?;

    let booster_params = BoosterParametersBuilder::default()
        .booster_type(BoosterType::Tree(tree_params))
        .learning_params(learning_params)
        .verbose(false)
        .threads(Some(threads as u32))
        .build()
        .map_err(engine_err)?;

    let dtrain = to_dmatrix(train)?;
    let dvalid = to_dmatrix(valid)?;

    let training_params = TrainingParametersBuilder::default()
        .dtrain(&dtrain)
        .boost_rounds(N_TREES)
        .booster_params(booster_params)
        .evaluation_sets(None)
        .build()
        .map_err(engine_err)?;

    let model = Booster::train(&training_params).map_err(engine_err)?;
    let predictions = model.predict(&dvalid).map_err(engine_err)?;

    Ok(rmse(&predictions, &valid.targets_vec()))
}
