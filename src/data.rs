//! Dataset handling for benchmark trials.
//!
//! A [`Dataset`] is a sample-major feature matrix plus a regression target per
//! row. The harness never trains on the base dataset directly: every trial
//! iteration draws a fresh bootstrap resample of the requested row count, so
//! dataset size is a grid axis rather than a property of the input file.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;

/// Errors from dataset construction.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("row count mismatch: {features} feature rows vs {targets} targets")]
    RowCountMismatch { features: usize, targets: usize },

    #[error("dataset must contain at least one row")]
    Empty,
}

/// A dense regression dataset, sample-major: shape `(n_rows, n_cols)`.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f32>,
    targets: Array1<f32>,
}

impl Dataset {
    /// Create a dataset, validating that features and targets agree on row count.
    pub fn new(features: Array2<f32>, targets: Array1<f32>) -> Result<Self, DataError> {
        if features.nrows() != targets.len() {
            return Err(DataError::RowCountMismatch {
                features: features.nrows(),
                targets: targets.len(),
            });
        }
        if features.nrows() == 0 {
            return Err(DataError::Empty);
        }
        Ok(Self { features, targets })
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    pub fn targets(&self) -> ArrayView1<'_, f32> {
        self.targets.view()
    }

    /// Copy the features out in contiguous row-major order.
    ///
    /// Engine FFI layers want a flat `[row0_col0, row0_col1, ...]` buffer.
    pub fn features_row_major(&self) -> Vec<f32> {
        self.features.iter().copied().collect()
    }

    pub fn targets_vec(&self) -> Vec<f32> {
        self.targets.to_vec()
    }

    /// Gather a new dataset from the given row indices (duplicates allowed).
    ///
    /// # Panics
    /// Panics if any index is out of bounds.
    pub fn select_rows(&self, indices: &[usize]) -> Dataset {
        let cols = self.n_cols();
        let features =
            Array2::from_shape_fn((indices.len(), cols), |(i, j)| self.features[[indices[i], j]]);
        let targets = Array1::from_shape_fn(indices.len(), |i| self.targets[indices[i]]);
        Dataset { features, targets }
    }

    /// Draw a bootstrap resample of `rows` rows (sampling with replacement).
    ///
    /// The RNG is passed in so a caller seeding it once per sweep gets a
    /// deterministic sequence of resamples.
    pub fn sample_with_replacement<R: Rng>(&self, rows: usize, rng: &mut R) -> Dataset {
        let n = self.n_rows();
        let indices: Vec<usize> = (0..rows).map(|_| rng.gen_range(0..n)).collect();
        self.select_rows(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    fn small() -> Dataset {
        Dataset::new(
            array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]],
            array![1.0, 2.0, 3.0],
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_mismatched_rows() {
        let err = Dataset::new(array![[1.0], [2.0]], array![1.0]).unwrap_err();
        assert!(matches!(
            err,
            DataError::RowCountMismatch { features: 2, targets: 1 }
        ));
    }

    #[test]
    fn new_rejects_empty() {
        let err = Dataset::new(Array2::zeros((0, 3)), Array1::zeros(0)).unwrap_err();
        assert!(matches!(err, DataError::Empty));
    }

    #[test]
    fn select_rows_keeps_feature_target_pairing() {
        let ds = small().select_rows(&[2, 0, 2]);
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.features_row_major(), vec![3.0, 30.0, 1.0, 10.0, 3.0, 30.0]);
        assert_eq!(ds.targets_vec(), vec![3.0, 1.0, 3.0]);
    }

    #[test]
    fn resample_is_deterministic_for_a_given_seed() {
        let ds = small();
        let mut a = rand::rngs::StdRng::seed_from_u64(7);
        let mut b = rand::rngs::StdRng::seed_from_u64(7);
        let x = ds.sample_with_replacement(10, &mut a);
        let y = ds.sample_with_replacement(10, &mut b);
        assert_eq!(x.targets_vec(), y.targets_vec());
        assert_eq!(x.n_rows(), 10);
        assert_eq!(x.n_cols(), 2);
    }
}
