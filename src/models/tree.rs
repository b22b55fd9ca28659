//! Regression tree
//!
//! The shared building block behind the random forest and the
//! gradient-boosted ensemble. Splits greedily minimize within-node
//! variance; candidate thresholds are midpoints between consecutive
//! distinct feature values.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Regression tree configuration
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Maximum depth; None grows until nodes are pure or too small
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples in each child
    pub min_samples_leaf: usize,
    /// Features considered per node; None = all
    pub max_features: Option<usize>,
    /// Random seed for feature subsampling order
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

/// Tree node: an internal split or a leaf carrying the node mean
#[derive(Debug, Clone)]
struct TreeNode {
    feature_idx: Option<usize>,
    threshold: Option<f64>,
    value: f64,
    left: Option<Box<TreeNode>>,
    right: Option<Box<TreeNode>>,
}

impl TreeNode {
    fn leaf(value: f64) -> Self {
        Self {
            feature_idx: None,
            threshold: None,
            value,
            left: None,
            right: None,
        }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Single regression tree
#[derive(Debug, Clone)]
pub struct RegressionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
}

impl RegressionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self { config, root: None }
    }

    /// Grow the tree on the full training set
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) {
        let indices: Vec<usize> = (0..x.nrows()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.root = Some(self.build_tree(x, y, &indices, 0, &mut rng));
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let values: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
        let node_mean = mean(&values);

        let depth_reached = self
            .config
            .max_depth
            .map(|limit| depth >= limit)
            .unwrap_or(false);
        if depth_reached
            || indices.len() < self.config.min_samples_split
            || variance(&values) < 1e-12
        {
            return TreeNode::leaf(node_mean);
        }

        match self.find_best_split(x, y, indices, rng) {
            Some((feature_idx, threshold, left_indices, right_indices)) => {
                let left = self.build_tree(x, y, &left_indices, depth + 1, rng);
                let right = self.build_tree(x, y, &right_indices, depth + 1, rng);

                TreeNode {
                    feature_idx: Some(feature_idx),
                    threshold: Some(threshold),
                    value: node_mean,
                    left: Some(Box::new(left)),
                    right: Some(Box::new(right)),
                }
            }
            None => TreeNode::leaf(node_mean),
        }
    }

    /// Best variance-reducing split over the sampled feature set
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64, Vec<usize>, Vec<usize>)> {
        let n_features = x.ncols();
        let max_features = self.config.max_features.unwrap_or(n_features).min(n_features);

        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);

        let parent_values: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
        let parent_impurity = variance(&parent_values);

        let mut best_gain = 0.0;
        let mut best_split: Option<(usize, f64, Vec<usize>, Vec<usize>)> = None;

        for &feature_idx in &feature_indices {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, feature_idx]] <= threshold);

                if left_idx.len() < self.config.min_samples_leaf
                    || right_idx.len() < self.config.min_samples_leaf
                {
                    continue;
                }

                let left_values: Vec<f64> = left_idx.iter().map(|&i| y[i]).collect();
                let right_values: Vec<f64> = right_idx.iter().map(|&i| y[i]).collect();

                let n_left = left_idx.len() as f64;
                let n_right = right_idx.len() as f64;
                let weighted = (n_left * variance(&left_values)
                    + n_right * variance(&right_values))
                    / (n_left + n_right);
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    best_split = Some((feature_idx, threshold, left_idx, right_idx));
                }
            }
        }

        best_split
    }

    /// Predict a single row
    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = match &self.root {
            Some(root) => root,
            None => return 0.0,
        };

        while !node.is_leaf() {
            let feature_idx = match node.feature_idx {
                Some(idx) => idx,
                None => break,
            };
            let threshold = node.threshold.unwrap_or(f64::INFINITY);

            node = if row[feature_idx] <= threshold {
                match &node.left {
                    Some(left) => left,
                    None => break,
                }
            } else {
                match &node.right {
                    Some(right) => right,
                    None => break,
                }
            };
        }

        node.value
    }

    /// Predict every row of a matrix
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        Array1::from_iter(x.axis_iter(Axis(0)).map(|row| self.predict_row(row)))
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}
