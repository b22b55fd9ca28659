//! Epsilon-insensitive support vector regression
//!
//! RBF kernel with the scale heuristic for gamma. The dual problem is
//! solved by cyclic coordinate descent over the box [-C, C]; the bias
//! term is folded into the kernel by adding a constant component, which
//! keeps the solver free of an equality constraint.

use super::{ModelError, ModelResult, Regressor};
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Support vector regressor
#[derive(Debug, Clone)]
pub struct SvrRegressor {
    c: f64,
    epsilon: f64,
    max_iter: usize,
    tolerance: f64,
    gamma: Option<f64>,
    /// Dual coefficients, one per training row
    beta: Option<Array1<f64>>,
    x_train: Option<Array2<f64>>,
}

impl SvrRegressor {
    /// Create a new regressor with box constraint `c` and tube width
    /// `epsilon`
    pub fn new(c: f64, epsilon: f64) -> Self {
        Self {
            c,
            epsilon,
            max_iter: 1000,
            tolerance: 1e-4,
            gamma: None,
            beta: None,
            x_train: None,
        }
    }

    /// Scale heuristic: 1 / (n_features * var(X)), falling back to
    /// 1 / n_features for constant inputs
    fn scale_gamma(x: &Array2<f64>) -> f64 {
        let n_features = x.ncols().max(1) as f64;
        let variance = {
            let mean = x.mean().unwrap_or(0.0);
            x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (x.len().max(1) as f64)
        };
        if variance > 1e-12 {
            1.0 / (n_features * variance)
        } else {
            1.0 / n_features
        }
    }

    fn rbf(gamma: f64, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        let squared: f64 = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum();
        (-gamma * squared).exp()
    }
}

impl Default for SvrRegressor {
    fn default() -> Self {
        Self::new(1.0, 0.1)
    }
}

impl Regressor for SvrRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        let n = x.nrows();
        if n == 0 {
            return Err(ModelError::ComputationError(
                "empty training set".to_string(),
            ));
        }

        let gamma = Self::scale_gamma(x);

        // Gram matrix with the constant bias component baked in
        let mut kernel = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in i..n {
                let value = Self::rbf(gamma, x.row(i), x.row(j)) + 1.0;
                kernel[[i, j]] = value;
                kernel[[j, i]] = value;
            }
        }

        let mut beta = Array1::<f64>::zeros(n);
        // f_i = sum_j beta_j K_ij, maintained incrementally
        let mut f = Array1::<f64>::zeros(n);

        for _iter in 0..self.max_iter {
            let mut max_change: f64 = 0.0;

            for i in 0..n {
                let q = kernel[[i, i]];
                // Partial gradient excluding beta_i's own contribution
                let r = f[i] - beta[i] * q - y[i];

                let unclipped = if r > self.epsilon {
                    (-r + self.epsilon) / q
                } else if r < -self.epsilon {
                    (-r - self.epsilon) / q
                } else {
                    0.0
                };
                let new_beta = unclipped.clamp(-self.c, self.c);

                let delta = new_beta - beta[i];
                if delta != 0.0 {
                    let column = kernel.index_axis(Axis(1), i);
                    f = &f + &(&column * delta);
                    beta[i] = new_beta;
                }
                max_change = max_change.max(delta.abs());
            }

            if max_change < self.tolerance {
                break;
            }
        }

        self.gamma = Some(gamma);
        self.beta = Some(beta);
        self.x_train = Some(x.clone());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        let gamma = self.gamma.ok_or(ModelError::NotFitted)?;
        let beta = self.beta.as_ref().ok_or(ModelError::NotFitted)?;
        let x_train = self.x_train.as_ref().ok_or(ModelError::NotFitted)?;

        if x.ncols() != x_train.ncols() {
            return Err(ModelError::DimensionMismatch {
                expected: x_train.ncols(),
                got: x.ncols(),
            });
        }

        let predictions = x
            .axis_iter(Axis(0))
            .map(|row| {
                x_train
                    .axis_iter(Axis(0))
                    .zip(beta.iter())
                    .map(|(train_row, &b)| b * (Self::rbf(gamma, row, train_row) + 1.0))
                    .sum()
            })
            .collect::<Vec<f64>>();

        Ok(Array1::from_vec(predictions))
    }
}
