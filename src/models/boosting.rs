//! Gradient boosting with squared-error loss
//!
//! Stagewise additive model: start from the target mean, then repeatedly
//! fit a shallow regression tree to the current residuals and add a
//! damped fraction of its output.

use super::tree::{RegressionTree, TreeConfig};
use super::{ModelError, ModelResult, Regressor};
use ndarray::{Array1, Array2, Axis};

/// Gradient boosting regressor
#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    n_estimators: usize,
    learning_rate: f64,
    max_depth: usize,
    seed: u64,
    /// Initial constant prediction (target mean), set by fit
    init: Option<f64>,
    trees: Vec<RegressionTree>,
}

impl GradientBoostingRegressor {
    pub fn new(n_estimators: usize, learning_rate: f64, max_depth: usize, seed: u64) -> Self {
        Self {
            n_estimators,
            learning_rate,
            max_depth,
            seed,
            init: None,
            trees: Vec::new(),
        }
    }

    /// Number of fitted stages
    pub fn n_stages(&self) -> usize {
        self.trees.len()
    }
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        Self::new(100, 0.1, 3, 42)
    }
}

impl Regressor for GradientBoostingRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        let init = y.mean().ok_or_else(|| {
            ModelError::ComputationError("empty training set".to_string())
        })?;

        let mut current = Array1::from_elem(y.len(), init);
        let mut trees = Vec::with_capacity(self.n_estimators);

        for stage in 0..self.n_estimators {
            let residuals = y - &current;

            let mut tree = RegressionTree::new(TreeConfig {
                max_depth: Some(self.max_depth),
                min_samples_split: 2,
                min_samples_leaf: 1,
                max_features: None,
                seed: self.seed.wrapping_add(stage as u64),
            });
            tree.fit(x, &residuals);

            let update = tree.predict(x);
            current = &current + &(&update * self.learning_rate);
            trees.push(tree);
        }

        self.init = Some(init);
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        let init = self.init.ok_or(ModelError::NotFitted)?;

        let predictions = x
            .axis_iter(Axis(0))
            .map(|row| {
                init + self.learning_rate
                    * self
                        .trees
                        .iter()
                        .map(|tree| tree.predict_row(row))
                        .sum::<f64>()
            })
            .collect::<Vec<f64>>();

        Ok(Array1::from_vec(predictions))
    }
}
