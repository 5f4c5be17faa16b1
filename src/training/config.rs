//! Modeling pipeline configuration

use serde::{Deserialize, Serialize};

/// Fraction of rows held out for evaluation
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Seed shared by the split shuffle and forest construction
pub const DEFAULT_SEED: u64 = 42;

/// Trees in the ensemble
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Configuration for the split and both regressors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Held-out fraction, strictly between 0 and 1
    pub test_fraction: f64,

    /// Random seed for reproducibility
    pub seed: u64,

    /// Number of trees in the random forest
    pub n_estimators: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            n_estimators: DEFAULT_N_ESTIMATORS,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }
}
