//! Linear least squares and polynomial regression
//!
//! The closed-form baselines of the benchmark: ordinary least squares
//! with or without an intercept, and a degree-n polynomial expansion
//! feeding the same solver. The square-root and linear impact laws are
//! OLS through the origin on a single engineered column.

use super::{ModelError, ModelResult, Regressor};
use ndarray::{s, Array1, Array2, Axis};

/// Linear regression fitted by ordinary least squares
#[derive(Debug, Clone)]
pub struct LinearRegression {
    /// Coefficients (weights) for each feature
    pub coefficients: Option<Array1<f64>>,
    /// Intercept term, 0.0 when fitting through the origin
    pub intercept: Option<f64>,
    fit_intercept: bool,
}

impl LinearRegression {
    /// Create a new model; `fit_intercept` false forces the fit through
    /// the origin, as the square-root and linear impact laws require.
    pub fn new(fit_intercept: bool) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept,
        }
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Regressor for LinearRegression {
    /// Solve the normal equations beta = (X'X)^-1 X'y
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }

        let x_design = if self.fit_intercept {
            let ones = Array2::ones((x.nrows(), 1));
            ndarray::concatenate(Axis(1), &[ones.view(), x.view()])
                .map_err(|e| ModelError::ComputationError(e.to_string()))?
        } else {
            x.clone()
        };

        let xt = x_design.t();
        let xtx = xt.dot(&x_design);
        let xty = xt.dot(y);

        let beta = solve_normal_equations(&xtx, &xty)?;

        if self.fit_intercept {
            self.intercept = Some(beta[0]);
            self.coefficients = Some(beta.slice(s![1..]).to_owned());
        } else {
            self.intercept = Some(0.0);
            self.coefficients = Some(beta);
        }

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(ModelError::NotFitted)?;
        let intercept = self.intercept.ok_or(ModelError::NotFitted)?;

        if x.ncols() != coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: coefficients.len(),
                got: x.ncols(),
            });
        }

        Ok(x.dot(coefficients) + intercept)
    }
}

/// Polynomial regression: power expansion of each column followed by OLS.
///
/// Column j expands to [x_j, x_j^2, .., x_j^degree] with no interaction
/// terms; the intercept comes from the inner linear fit. The benchmark
/// applies this to single-column inputs, where the expansion is the full
/// polynomial basis.
#[derive(Debug, Clone)]
pub struct PolynomialRegression {
    degree: usize,
    model: LinearRegression,
}

impl PolynomialRegression {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            model: LinearRegression::new(true),
        }
    }

    fn expand(&self, x: &Array2<f64>) -> Array2<f64> {
        let n_samples = x.nrows();
        let n_expanded = x.ncols() * self.degree;
        let mut expanded = Array2::zeros((n_samples, n_expanded));
        for i in 0..n_samples {
            for j in 0..x.ncols() {
                for d in 1..=self.degree {
                    expanded[[i, j * self.degree + d - 1]] = x[[i, j]].powi(d as i32);
                }
            }
        }
        expanded
    }
}

impl Regressor for PolynomialRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        let expanded = self.expand(x);
        self.model.fit(&expanded, y)
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        let expanded = self.expand(x);
        self.model.predict(&expanded)
    }
}

/// Solve A beta = b for symmetric positive definite A via Cholesky.
///
/// A tiny ridge on the diagonal keeps near-collinear designs solvable.
pub(crate) fn solve_normal_equations(
    xtx: &Array2<f64>,
    xty: &Array1<f64>,
) -> ModelResult<Array1<f64>> {
    let n = xtx.nrows();

    let mut a = xtx.clone();
    for i in 0..n {
        a[[i, i]] += 1e-10;
    }

    // Cholesky decomposition: A = L * L^T
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return Err(ModelError::SingularMatrix);
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * z[j];
        }
        z[i] = (xty[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T beta = z
    let mut beta = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * beta[j];
        }
        beta[i] = (z[i] - sum) / l[[i, i]];
    }

    Ok(beta)
}
