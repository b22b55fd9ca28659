//! Library-backed boosted trees
//!
//! This module wraps the `gbdt` crate's gradient boosted decision trees,
//! adapting its f32 row-based interface to the ndarray regressor trait
//! used by the rest of the benchmark. The library panics on non-finite
//! feature values, so the wrapper rejects them up front as
//! [`ModelError::Library`].

use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec, ValueType};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use tracing::debug;

use super::{ModelError, ModelResult, Regressor};

/// Hyperparameters forwarded to the library trainer
#[derive(Debug, Clone)]
pub struct GbdtParams {
    /// Number of boosting iterations (trees)
    pub iterations: usize,
    /// Maximum depth of each tree
    pub max_depth: u32,
    /// Learning rate applied to each tree's contribution
    pub shrinkage: f64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            iterations: 100,
            max_depth: 6,
            shrinkage: 0.3,
        }
    }
}

/// Gradient boosted trees backed by the `gbdt` crate
pub struct GbdtRegressor {
    params: GbdtParams,
    feature_size: usize,
    model: Option<GBDT>,
}

impl GbdtRegressor {
    /// Create an untrained regressor with the given hyperparameters
    pub fn new(params: GbdtParams) -> Self {
        Self {
            params,
            feature_size: 0,
            model: None,
        }
    }

    /// Get the hyperparameters
    pub fn params(&self) -> &GbdtParams {
        &self.params
    }

    fn row_features(row: ArrayView1<'_, f64>) -> Vec<ValueType> {
        row.iter().map(|&v| v as ValueType).collect()
    }
}

impl Default for GbdtRegressor {
    fn default() -> Self {
        Self::new(GbdtParams::default())
    }
}

impl Regressor for GbdtRegressor {
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
        // gbdt sorts raw feature values with a bare unwrap while building
        // its training cache; a non-finite cell panics inside the library
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::Library(
                "non-finite feature value in training data".to_string(),
            ));
        }

        let mut cfg = Config::new();
        cfg.set_feature_size(x.ncols());
        cfg.set_max_depth(self.params.max_depth);
        cfg.set_iterations(self.params.iterations);
        cfg.set_shrinkage(self.params.shrinkage as ValueType);
        cfg.set_loss("SquaredError");
        cfg.set_debug(false);

        let mut train: DataVec = x
            .axis_iter(Axis(0))
            .zip(y.iter())
            .map(|(row, &label)| {
                Data::new_training_data(Self::row_features(row), 1.0, label as ValueType, None)
            })
            .collect();

        let mut model = GBDT::new(&cfg);
        model.fit(&mut train);

        debug!(
            "Trained library GBDT on {} rows with {} iterations",
            x.nrows(),
            self.params.iterations
        );

        self.feature_size = x.ncols();
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        let model = self.model.as_ref().ok_or(ModelError::NotFitted)?;
        if x.ncols() != self.feature_size {
            return Err(ModelError::DimensionMismatch {
                expected: self.feature_size,
                got: x.ncols(),
            });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::Library(
                "non-finite feature value in test data".to_string(),
            ));
        }

        let test: DataVec = x
            .axis_iter(Axis(0))
            .map(|row| Data::new_test_data(Self::row_features(row), None))
            .collect();

        let predicted = model.predict(&test);
        if predicted.len() != x.nrows() {
            return Err(ModelError::Library(format!(
                "expected {} predictions, got {}",
                x.nrows(),
                predicted.len()
            )));
        }

        Ok(predicted.into_iter().map(f64::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wavy_data() -> (Array2<f64>, Array1<f64>) {
        let n = 60;
        let mut x = Array2::zeros((n, 2));
        let mut y = Array1::zeros(n);
        for i in 0..n {
            let a = i as f64 * 0.1;
            let b = (i % 7) as f64;
            x[[i, 0]] = a;
            x[[i, 1]] = b;
            y[i] = (a * 1.5).sin() + 0.2 * b;
        }
        (x, y)
    }

    #[test]
    fn test_gbdt_fits_training_data_closely() {
        let (x, y) = wavy_data();
        let mut model = GbdtRegressor::default();
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        let mse: f64 = y
            .iter()
            .zip(preds.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum::<f64>()
            / y.len() as f64;
        let mean = y.sum() / y.len() as f64;
        let var: f64 = y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / y.len() as f64;

        assert!(preds.iter().all(|p| p.is_finite()));
        assert!(mse < 0.1 * var, "train mse {} vs variance {}", mse, var);
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let model = GbdtRegressor::default();
        let x = Array2::zeros((3, 2));
        assert!(matches!(model.predict(&x), Err(ModelError::NotFitted)));
    }

    #[test]
    fn test_predict_column_mismatch_errors() {
        let (x, y) = wavy_data();
        let mut model = GbdtRegressor::default();
        model.fit(&x, &y).unwrap();

        let narrow = Array2::zeros((4, 1));
        assert!(matches!(
            model.predict(&narrow),
            Err(ModelError::DimensionMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_non_finite_training_cell_errors() {
        let (mut x, y) = wavy_data();
        x[[10, 1]] = f64::NAN;

        let mut model = GbdtRegressor::default();
        assert!(matches!(model.fit(&x, &y), Err(ModelError::Library(_))));
    }

    #[test]
    fn test_non_finite_test_cell_errors() {
        let (x, y) = wavy_data();
        let mut model = GbdtRegressor::default();
        model.fit(&x, &y).unwrap();

        let mut test = x.clone();
        test[[0, 0]] = f64::INFINITY;
        assert!(matches!(model.predict(&test), Err(ModelError::Library(_))));
    }
}
