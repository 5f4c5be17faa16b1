//! Random Forest regressor

use super::decision_tree::DecisionTree;
use super::models::{check_fit_input, check_predict_input, Regressor};
use crate::error::{DashboardError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bootstrap-aggregated regression trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Base seed; tree `i` uses `random_state + i`
    pub random_state: u64,
    feature_importances: Option<Array1<f64>>,
    n_features: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            random_state: 0,
            feature_importances: None,
            n_features: 0,
        }
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Get number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn build_tree(&self, tree_idx: usize, x: &Array2<f64>, y: &Array1<f64>) -> Result<DecisionTree> {
        let n_samples = x.nrows();
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.wrapping_add(tree_idx as u64));

        // Bootstrap sample of the same size, drawn with replacement
        let sample_indices: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

        let x_boot = x.select(Axis(0), &sample_indices);
        let y_boot = y.select(Axis(0), &sample_indices);

        let mut tree = DecisionTree::new();
        tree.fit_with_rng(&x_boot, &y_boot, &mut rng)?;
        Ok(tree)
    }

    /// Average of per-tree normalized importances, renormalized to sum to 1
    fn compute_feature_importances(&self) -> Array1<f64> {
        let mut total = Array1::<f64>::zeros(self.n_features);

        for imp in self.trees.iter().filter_map(|t| t.importances()) {
            total += imp;
        }
        total /= self.trees.len().max(1) as f64;

        let sum = total.sum();
        if sum > 0.0 {
            total /= sum;
        }
        total
    }
}

impl Regressor for RandomForest {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if self.is_fitted() {
            return Err(DashboardError::AlreadyFitted);
        }
        check_fit_input(x, y)?;
        if self.n_estimators == 0 {
            return Err(DashboardError::Validation(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        // Each tree owns a generator derived from the base seed, so the forest
        // is identical however rayon schedules the work.
        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| self.build_tree(tree_idx, x, y))
            .collect::<Result<_>>()?;

        self.n_features = x.ncols();
        self.trees = trees;
        self.feature_importances = Some(self.compute_feature_importances());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(DashboardError::ModelNotTrained);
        }
        check_predict_input(x, self.n_features)?;

        let all_predictions: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<_>>()?;

        // Summed in tree order for a deterministic result
        let mut sum = Array1::<f64>::zeros(x.nrows());
        for preds in &all_predictions {
            sum += preds;
        }
        Ok(sum / all_predictions.len() as f64)
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.feature_importances.clone()
    }
}
