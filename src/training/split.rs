//! Seeded train/test partitioning

use crate::error::{DashboardError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A reproducible partition of dataset rows into training and held-out sets
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

impl TrainTestSplit {
    pub fn n_train(&self) -> usize {
        self.train_indices.len()
    }

    pub fn n_test(&self) -> usize {
        self.test_indices.len()
    }
}

/// Number of held-out rows for `n` samples: `ceil(test_fraction * n)`
pub fn test_size(n_samples: usize, test_fraction: f64) -> usize {
    (test_fraction * n_samples as f64).ceil() as usize
}

/// Shuffle row indices with a seeded generator and cut off the held-out set.
///
/// The first `ceil(test_fraction * n)` indices of the permutation form the
/// test set, the remainder the training set.
pub fn shuffled_indices(
    n_samples: usize,
    test_fraction: f64,
    rng: &mut ChaCha8Rng,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DashboardError::InvalidSplit(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let n_test = test_size(n_samples, test_fraction);
    if n_test == 0 || n_test >= n_samples {
        return Err(DashboardError::InvalidSplit(format!(
            "{} samples cannot be split with test_fraction {}",
            n_samples, test_fraction
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(rng);
    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Split features and target into training and held-out partitions
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if x.nrows() != y.len() {
        return Err(DashboardError::Shape {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (train_indices, test_indices) = shuffled_indices(x.nrows(), test_fraction, &mut rng)?;

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), &train_indices),
        x_test: x.select(Axis(0), &test_indices),
        y_train: y.select(Axis(0), &train_indices),
        y_test: y.select(Axis(0), &test_indices),
        train_indices,
        test_indices,
    })
}
