//! Regularized linear regression: Ridge and Elastic Net
//!
//! Both models penalize coefficient size on the full feature set, where
//! the engineered columns are strongly correlated (sqrt_xV, x_over_V and
//! log_x all grow with order size).

use super::linear::solve_normal_equations;
use super::{ModelError, ModelResult, Regressor};
use ndarray::{Array1, Array2, Axis};

/// Ridge regression (L2 penalty)
///
/// Minimizes ||y - Xb||^2 + alpha ||b||^2 with the intercept left
/// unpenalized via centering.
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    alpha: f64,
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Intercept term
    pub intercept: Option<f64>,
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            coefficients: None,
            intercept: None,
        }
    }
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Regressor for RidgeRegression {
    /// Closed form on centered data: b = (Xc'Xc + alpha I)^-1 Xc'yc
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| ModelError::ComputationError("empty feature matrix".to_string()))?;
        let y_mean = y
            .mean()
            .ok_or_else(|| ModelError::ComputationError("empty target vector".to_string()))?;
        let x_centered = x - &x_mean;
        let y_centered = y - y_mean;

        let mut xtx = x_centered.t().dot(&x_centered);
        for i in 0..xtx.nrows() {
            xtx[[i, i]] += self.alpha;
        }
        let xty = x_centered.t().dot(&y_centered);

        let coefficients = solve_normal_equations(&xtx, &xty)?;
        self.intercept = Some(y_mean - x_mean.dot(&coefficients));
        self.coefficients = Some(coefficients);

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        let coef = self.coefficients.as_ref().ok_or(ModelError::NotFitted)?;
        let intercept = self.intercept.ok_or(ModelError::NotFitted)?;

        if x.ncols() != coef.len() {
            return Err(ModelError::DimensionMismatch {
                expected: coef.len(),
                got: x.ncols(),
            });
        }

        Ok(x.dot(coef) + intercept)
    }
}

/// Elastic net regression (mixed L1 + L2 penalty)
///
/// Minimizes (1/2n)||y - Xb||^2 + alpha * l1_ratio * ||b||_1
///            + alpha * (1 - l1_ratio) / 2 * ||b||^2
/// by cyclic coordinate descent with soft thresholding.
#[derive(Debug, Clone)]
pub struct ElasticNetRegression {
    alpha: f64,
    /// Balance between L1 and L2 (0 = pure ridge, 1 = pure lasso)
    l1_ratio: f64,
    max_iter: usize,
    tolerance: f64,
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Intercept term
    pub intercept: Option<f64>,
}

impl ElasticNetRegression {
    pub fn new(alpha: f64, l1_ratio: f64) -> Self {
        Self {
            alpha,
            l1_ratio: l1_ratio.clamp(0.0, 1.0),
            max_iter: 1000,
            tolerance: 1e-4,
            coefficients: None,
            intercept: None,
        }
    }
}

impl Default for ElasticNetRegression {
    fn default() -> Self {
        Self::new(1.0, 0.5)
    }
}

impl Regressor for ElasticNetRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }

        let n_samples = x.nrows() as f64;
        let n_features = x.ncols();

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| ModelError::ComputationError("empty feature matrix".to_string()))?;
        let y_mean = y
            .mean()
            .ok_or_else(|| ModelError::ComputationError("empty target vector".to_string()))?;
        let x_centered = x - &x_mean;
        let y_centered = y - y_mean;

        let l1_penalty = self.alpha * self.l1_ratio * n_samples;
        let l2_penalty = self.alpha * (1.0 - self.l1_ratio) * n_samples;

        // Per-column denominator: sum of squares plus the L2 term
        let x_squared_sum: Vec<f64> = x_centered
            .columns()
            .into_iter()
            .map(|col| col.iter().map(|&v| v * v).sum::<f64>() + l2_penalty)
            .collect();

        let mut coef = Array1::<f64>::zeros(n_features);

        for _iter in 0..self.max_iter {
            let coef_old = coef.clone();

            for j in 0..n_features {
                let mut residual = y_centered.clone();
                for k in 0..n_features {
                    if k != j {
                        residual = &residual - &(&x_centered.column(k) * coef[k]);
                    }
                }

                let rho: f64 = x_centered.column(j).dot(&residual);

                coef[j] = if x_squared_sum[j] > 1e-10 {
                    soft_threshold(rho, l1_penalty) / x_squared_sum[j]
                } else {
                    0.0
                };
            }

            let diff: f64 = coef
                .iter()
                .zip(coef_old.iter())
                .map(|(&a, &b)| (a - b).abs())
                .sum();
            if diff < self.tolerance {
                break;
            }
        }

        self.intercept = Some(y_mean - x_mean.dot(&coef));
        self.coefficients = Some(coef);

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        let coef = self.coefficients.as_ref().ok_or(ModelError::NotFitted)?;
        let intercept = self.intercept.ok_or(ModelError::NotFitted)?;

        if x.ncols() != coef.len() {
            return Err(ModelError::DimensionMismatch {
                expected: coef.len(),
                got: x.ncols(),
            });
        }

        Ok(x.dot(coef) + intercept)
    }
}

/// Soft thresholding operator
fn soft_threshold(x: f64, lambda: f64) -> f64 {
    if x > lambda {
        x - lambda
    } else if x < -lambda {
        x + lambda
    } else {
        0.0
    }
}
