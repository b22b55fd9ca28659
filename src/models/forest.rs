//! Random forest regressor
//!
//! Bagged ensemble of fully grown regression trees, one bootstrap sample
//! per tree, built in parallel. Seeds are derived from the base seed per
//! tree so refitting is reproducible.

use super::tree::{RegressionTree, TreeConfig};
use super::{ModelError, ModelResult, Regressor};
use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Random forest configuration
#[derive(Debug, Clone)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree; None grows them fully
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Bootstrap sampling per tree
    pub bootstrap: bool,
    /// Base random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Random forest model
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
        }
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(0..n)).collect()
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        if x.nrows() == 0 {
            return Err(ModelError::ComputationError(
                "empty training set".to_string(),
            ));
        }

        let n = x.nrows();
        self.trees = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_config = TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: None,
                    seed: self.config.seed.wrapping_add(i as u64),
                };
                let mut tree = RegressionTree::new(tree_config);

                if self.config.bootstrap {
                    let indices =
                        Self::bootstrap_indices(n, self.config.seed.wrapping_add(i as u64));
                    let x_sample = x.select(Axis(0), &indices);
                    let y_sample = y.select(Axis(0), &indices);
                    tree.fit(&x_sample, &y_sample);
                } else {
                    tree.fit(x, y);
                }

                tree
            })
            .collect();

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }

        let n_trees = self.trees.len() as f64;
        let predictions = x
            .axis_iter(Axis(0))
            .map(|row| {
                self.trees
                    .iter()
                    .map(|tree| tree.predict_row(row))
                    .sum::<f64>()
                    / n_trees
            })
            .collect::<Vec<f64>>();

        Ok(Array1::from_vec(predictions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave_data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let xs: Vec<f64> = (0..n).map(|i| i as f64 / 10.0).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| x + (x * 2.0).sin()).collect();
        (
            Array2::from_shape_vec((n, 1), xs).unwrap(),
            Array1::from_vec(ys),
        )
    }

    #[test]
    fn test_forest_fits_training_data() {
        let (x, y) = wave_data(60);

        let mut forest = RandomForestRegressor::new(ForestConfig {
            n_trees: 20,
            ..Default::default()
        });
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.n_trees(), 20);

        let predictions = forest.predict(&x).unwrap();
        let mse: f64 = predictions
            .iter()
            .zip(y.iter())
            .map(|(p, a)| (p - a).powi(2))
            .sum::<f64>()
            / y.len() as f64;
        assert!(mse < 0.1, "train mse = {mse}");
    }

    #[test]
    fn test_forest_is_reproducible() {
        let (x, y) = wave_data(40);

        let mut first = RandomForestRegressor::default();
        first.fit(&x, &y).unwrap();
        let mut second = RandomForestRegressor::default();
        second.fit(&x, &y).unwrap();

        assert_eq!(first.predict(&x).unwrap(), second.predict(&x).unwrap());
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let (x, _) = wave_data(5);
        let forest = RandomForestRegressor::default();
        assert!(matches!(forest.predict(&x), Err(ModelError::NotFitted)));
    }
}
