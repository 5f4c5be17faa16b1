//! CART regression tree

use super::models::{check_fit_input, check_predict_input, Regressor};
use crate::error::{DashboardError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf {
        value: f64,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        /// Reduction of the summed squared error achieved by this split
        gain: f64,
    },
}

/// Best split found for one node
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Nodes smaller than this become leaves
const MIN_SAMPLES_SPLIT: usize = 2;
/// Every leaf holds at least this many samples
const MIN_SAMPLES_LEAF: usize = 1;

/// Regression tree grown to purity with the squared-error criterion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    /// Seed used by `Regressor::fit`
    pub random_state: u64,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            random_state: 0,
            n_features: 0,
            feature_importances: None,
        }
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit the tree drawing split-order randomness from `rng`
    pub fn fit_with_rng(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rng: &mut ChaCha8Rng,
    ) -> Result<()> {
        if self.root.is_some() {
            return Err(DashboardError::AlreadyFitted);
        }
        check_fit_input(x, y)?;

        self.n_features = x.ncols();
        let mut importances = vec![0.0; self.n_features];

        let indices: Vec<usize> = (0..x.nrows()).collect();
        let root = self.build_tree(x, y, &indices, &mut importances, rng);

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        self.feature_importances = Some(Array1::from_vec(importances));
        self.root = Some(root);
        Ok(())
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let leaf = || TreeNode::Leaf {
            value: mean(y, indices),
            n_samples,
        };

        let should_stop = n_samples < MIN_SAMPLES_SPLIT
            || n_samples < 2 * MIN_SAMPLES_LEAF
            || is_pure(y, indices);
        if should_stop {
            return leaf();
        }

        let Some(split) = self.find_best_split(x, y, indices, rng) else {
            return leaf();
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, split.feature_idx]] <= split.threshold);

        if left_indices.len() < MIN_SAMPLES_LEAF || right_indices.len() < MIN_SAMPLES_LEAF {
            return leaf();
        }

        importances[split.feature_idx] += split.gain;

        let left = Box::new(self.build_tree(x, y, &left_indices, importances, rng));
        let right = Box::new(self.build_tree(x, y, &right_indices, importances, rng));

        TreeNode::Split {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left,
            right,
            n_samples,
            gain: split.gain,
        }
    }

    /// Scan candidate features in a random order and return the split with the
    /// largest squared-error reduction. Ties keep the first feature visited.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..x.ncols()).collect();
        features.shuffle(rng);

        let parent_sse = sse(
            indices.len() as f64,
            indices.iter().map(|&i| y[i]).sum(),
            indices.iter().map(|&i| y[i] * y[i]).sum(),
        );

        let per_feature: Vec<Option<SplitCandidate>> = features
            .par_iter()
            .map(|&feature_idx| {
                self.best_threshold(x.column(feature_idx), y, indices, parent_sse)
                    .map(|(threshold, gain)| SplitCandidate {
                        feature_idx,
                        threshold,
                        gain,
                    })
            })
            .collect();

        per_feature
            .into_iter()
            .flatten()
            .fold(None, |best: Option<SplitCandidate>, candidate| match best {
                Some(b) if b.gain >= candidate.gain => Some(b),
                _ => Some(candidate),
            })
    }

    /// Sorted sweep over one feature using running sums
    fn best_threshold(
        &self,
        column: ArrayView1<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        parent_sse: f64,
    ) -> Option<(f64, f64)> {
        let mut pairs: Vec<(f64, f64)> = indices.iter().map(|&i| (column[i], y[i])).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = pairs.len();
        let total_sum: f64 = pairs.iter().map(|p| p.1).sum();
        let total_sq: f64 = pairs.iter().map(|p| p.1 * p.1).sum();

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        let mut best: Option<(f64, f64)> = None;

        for i in 0..n - 1 {
            let (value, target) = pairs[i];
            left_sum += target;
            left_sq += target * target;

            let next_value = pairs[i + 1].0;
            if next_value <= value {
                continue;
            }

            let left_count = i + 1;
            let right_count = n - left_count;
            if left_count < MIN_SAMPLES_LEAF || right_count < MIN_SAMPLES_LEAF {
                continue;
            }

            let child_sse = sse(left_count as f64, left_sum, left_sq)
                + sse(right_count as f64, total_sum - left_sum, total_sq - left_sq);
            let gain = parent_sse - child_sse;

            if gain > best.map_or(0.0, |b| b.1) {
                let mut threshold = (value + next_value) / 2.0;
                if threshold >= next_value {
                    threshold = value;
                }
                best = Some((threshold, gain));
            }
        }

        best
    }

    fn predict_sample(node: &TreeNode, sample: ArrayView1<f64>) -> f64 {
        match node {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                if sample[*feature_idx] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }

    /// Normalized importances of this tree
    pub fn importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        fn leaves(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => leaves(left) + leaves(right),
            }
        }
        self.root.as_ref().map_or(0, leaves)
    }
}

impl Regressor for DecisionTree {
    fn name(&self) -> &'static str {
        "decision_tree"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        self.fit_with_rng(x, y, &mut rng)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(DashboardError::ModelNotTrained)?;
        check_predict_input(x, self.n_features)?;

        Ok(x.rows()
            .into_iter()
            .map(|row| Self::predict_sample(root, row))
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.feature_importances.clone()
    }
}

/// Summed squared error from count, sum and sum of squares
fn sse(count: f64, sum: f64, sq_sum: f64) -> f64 {
    if count == 0.0 {
        return 0.0;
    }
    (sq_sum - sum * sum / count).max(0.0)
}

fn mean(y: &Array1<f64>, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn is_pure(y: &Array1<f64>, indices: &[usize]) -> bool {
    match indices.first() {
        None => true,
        Some(&first) => indices.iter().all(|&i| (y[i] - y[first]).abs() < 1e-10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_regressor_fits_training_data() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        // Fully grown tree memorizes distinct inputs
        let predictions = tree.predict(&x).unwrap();
        for (p, a) in predictions.iter().zip(y.iter()) {
            assert_abs_diff_eq!(*p, *a, epsilon = 1e-12);
        }
        assert_eq!(tree.get_n_leaves(), 5);
    }

    #[test]
    fn test_step_function_single_split() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![5.0, 5.0, 5.0, 20.0, 20.0, 20.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.get_depth(), 2);
        let pred = tree.predict(&array![[6.0], [7.0]]).unwrap();
        assert_eq!(pred[0], 5.0);
        assert_eq!(pred[1], 20.0);
    }

    #[test]
    fn test_feature_importances_ignore_constant_feature() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        let importances = tree.feature_importances().unwrap();
        assert_abs_diff_eq!(importances[0], 1.0, epsilon = 1e-12);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![7.0, 7.0, 7.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.get_n_leaves(), 1);
        assert_eq!(tree.predict(&array![[100.0]]).unwrap()[0], 7.0);
    }

    #[test]
    fn test_predict_before_fit() {
        let tree = DecisionTree::new();
        assert!(matches!(
            tree.predict(&array![[1.0]]),
            Err(DashboardError::ModelNotTrained)
        ));
    }

    #[test]
    fn test_same_seed_same_tree() {
        let x = Array2::from_shape_fn((40, 3), |(r, c)| ((r * (c + 3)) % 7) as f64);
        let y = Array1::from_shape_fn(40, |r| ((r * 5) % 11) as f64);

        let mut a = DecisionTree::new().with_random_state(9);
        let mut b = DecisionTree::new().with_random_state(9);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
        assert_eq!(a.feature_importances(), b.feature_importances());
    }
}
