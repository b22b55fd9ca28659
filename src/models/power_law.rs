//! Power-law impact curve estimator
//!
//! Fits slippage = alpha * r^beta over the participation ratio r (first
//! input column) by damped nonlinear least squares with the analytic
//! Jacobian. A fit that cannot converge is not an error: the estimator
//! records a Failed state, keeps NaN parameters and predicts NaN, so one
//! degenerate fold degrades that fold's score instead of aborting the
//! benchmark.

use super::{ModelError, ModelResult, Regressor};
use ndarray::{Array1, Array2};

/// Starting point for (alpha, beta)
const INITIAL_ALPHA: f64 = 1.0;
const INITIAL_BETA: f64 = 0.5;

/// Budget of residual-function evaluations for one fit
const MAX_FUNCTION_EVALS: usize = 10_000;

/// Relative cost-decrease threshold for convergence
const FTOL: f64 = 1e-8;
/// Step-size threshold for convergence
const XTOL: f64 = 1e-8;
/// Gradient-norm threshold for convergence at the current point
const GTOL: f64 = 1e-12;

/// Lifecycle of a [`PowerLawRegression`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitState {
    /// fit has not been called yet
    Unfit,
    /// fit converged to finite parameters
    Converged,
    /// fit could not produce parameters; alpha and beta are NaN
    Failed,
}

/// Nonlinear least-squares fit of y = alpha * r^beta
#[derive(Debug, Clone)]
pub struct PowerLawRegression {
    /// Scale parameter, NaN unless converged
    pub alpha: f64,
    /// Exponent parameter, NaN unless converged
    pub beta: f64,
    state: FitState,
}

impl PowerLawRegression {
    pub fn new() -> Self {
        Self {
            alpha: f64::NAN,
            beta: f64::NAN,
            state: FitState::Unfit,
        }
    }

    pub fn state(&self) -> FitState {
        self.state
    }

    fn mark_failed(&mut self) {
        self.alpha = f64::NAN;
        self.beta = f64::NAN;
        self.state = FitState::Failed;
    }

    /// Levenberg-Marquardt on the masked (r, y) pairs.
    ///
    /// Returns converged parameters or None when the budget runs out,
    /// the cost turns non-finite, or a damped step can never be solved.
    fn solve(ratios: &[f64], targets: &[f64]) -> Option<(f64, f64)> {
        let mut alpha = INITIAL_ALPHA;
        let mut beta = INITIAL_BETA;
        let mut lambda = 1e-3;
        let mut evals = 0;

        let mut cost = Self::cost(ratios, targets, alpha, beta, &mut evals)?;

        while evals < MAX_FUNCTION_EVALS {
            // An exact fit cannot improve further
            if cost <= 1e-30 {
                return Some((alpha, beta));
            }

            // Accumulate J'J and J'e with the analytic Jacobian
            // [d f/d alpha = r^beta, d f/d beta = alpha * r^beta * ln r]
            let mut s_aa = 0.0;
            let mut s_ab = 0.0;
            let mut s_bb = 0.0;
            let mut g_a = 0.0;
            let mut g_b = 0.0;
            for (&r, &y) in ratios.iter().zip(targets.iter()) {
                let rb = r.powf(beta);
                let error = y - alpha * rb;
                let ja = rb;
                let jb = alpha * rb * r.ln();
                s_aa += ja * ja;
                s_ab += ja * jb;
                s_bb += jb * jb;
                g_a += ja * error;
                g_b += jb * error;
            }

            if (g_a * g_a + g_b * g_b).sqrt() < GTOL {
                return Some((alpha, beta));
            }

            // Damped normal equations: (J'J + lambda diag(J'J)) delta = J'e
            let a11 = s_aa * (1.0 + lambda);
            let a22 = s_bb * (1.0 + lambda);
            let det = a11 * a22 - s_ab * s_ab;

            let (delta_a, delta_b) = if det.is_finite() && det.abs() > 1e-300 {
                (
                    (a22 * g_a - s_ab * g_b) / det,
                    (a11 * g_b - s_ab * g_a) / det,
                )
            } else {
                // No eval is spent here; an overflowed damping factor
                // can never make the system solvable again
                lambda *= 10.0;
                if !lambda.is_finite() {
                    return None;
                }
                continue;
            };

            let candidate_alpha = alpha + delta_a;
            let candidate_beta = beta + delta_b;
            let candidate_cost =
                Self::cost(ratios, targets, candidate_alpha, candidate_beta, &mut evals);

            match candidate_cost {
                Some(new_cost) if new_cost < cost => {
                    let improvement = cost - new_cost;
                    let step = (delta_a * delta_a + delta_b * delta_b).sqrt();
                    let scale = (alpha * alpha + beta * beta).sqrt();

                    alpha = candidate_alpha;
                    beta = candidate_beta;
                    cost = new_cost;
                    lambda = (lambda * 0.5).max(1e-12);

                    if improvement <= FTOL * cost.max(1e-30) || step <= XTOL * (scale + XTOL) {
                        return Some((alpha, beta));
                    }
                }
                _ => {
                    lambda *= 10.0;
                }
            }
        }

        None
    }

    /// Sum of squared residuals, None when non-finite
    fn cost(ratios: &[f64], targets: &[f64], alpha: f64, beta: f64, evals: &mut usize) -> Option<f64> {
        *evals += 1;
        let total: f64 = ratios
            .iter()
            .zip(targets.iter())
            .map(|(&r, &y)| {
                let error = y - alpha * r.powf(beta);
                error * error
            })
            .sum();
        total.is_finite().then_some(total)
    }
}

impl Default for PowerLawRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for PowerLawRegression {
    /// Fit on the rows where the ratio is positive and the target finite.
    ///
    /// Never returns an error: any degenerate input (no usable column,
    /// fewer than two valid rows, non-convergence) lands in the Failed
    /// state instead.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        if x.ncols() == 0 || x.nrows() != y.len() {
            self.mark_failed();
            return Ok(());
        }

        let mut ratios = Vec::new();
        let mut targets = Vec::new();
        for (&r, &yi) in x.column(0).iter().zip(y.iter()) {
            if r > 0.0 && yi.is_finite() {
                ratios.push(r);
                targets.push(yi);
            }
        }

        if ratios.len() < 2 {
            self.mark_failed();
            return Ok(());
        }

        match Self::solve(&ratios, &targets) {
            Some((alpha, beta)) if alpha.is_finite() && beta.is_finite() => {
                self.alpha = alpha;
                self.beta = beta;
                self.state = FitState::Converged;
            }
            _ => self.mark_failed(),
        }

        Ok(())
    }

    /// Evaluate alpha * r^beta over every row, unmasked.
    ///
    /// A Failed fit yields NaN for every row.
    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        if self.state == FitState::Unfit {
            return Err(ModelError::NotFitted);
        }
        if x.ncols() == 0 {
            return Err(ModelError::DimensionMismatch {
                expected: 1,
                got: 0,
            });
        }

        Ok(x.column(0).mapv(|r| self.alpha * r.powf(self.beta)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn power_data(alpha: f64, beta: f64, n: usize) -> (Array2<f64>, Array1<f64>) {
        let ratios: Vec<f64> = (1..=n).map(|i| 0.01 * i as f64).collect();
        let targets: Vec<f64> = ratios.iter().map(|r| alpha * r.powf(beta)).collect();
        (
            Array2::from_shape_vec((n, 1), ratios).unwrap(),
            Array1::from_vec(targets),
        )
    }

    #[test]
    fn test_recovers_exact_power_law() {
        let (x, y) = power_data(2.5, 0.6, 40);

        let mut model = PowerLawRegression::new();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.state(), FitState::Converged);
        assert!((model.alpha - 2.5).abs() < 1e-4, "alpha = {}", model.alpha);
        assert!((model.beta - 0.6).abs() < 1e-4, "beta = {}", model.beta);
    }

    #[test]
    fn test_square_root_law_recovery() {
        let (x, y) = power_data(1.3, 0.5, 25);

        let mut model = PowerLawRegression::new();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.state(), FitState::Converged);
        assert!((model.alpha - 1.3).abs() < 1e-4);
        assert!((model.beta - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_no_valid_rows_fails_without_error() {
        let x = Array2::from_shape_vec((3, 1), vec![-1.0, 0.0, -0.5]).unwrap();
        let y = Array1::from_vec(vec![1.0, 2.0, 3.0]);

        let mut model = PowerLawRegression::new();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.state(), FitState::Failed);
        assert!(model.alpha.is_nan());
        assert!(model.beta.is_nan());

        let predictions = model.predict(&x).unwrap();
        assert!(predictions.iter().all(|p| p.is_nan()));
    }

    #[test]
    fn test_non_finite_targets_are_masked() {
        let (x, mut y) = power_data(2.0, 0.5, 20);
        y[3] = f64::NAN;
        y[11] = f64::INFINITY;

        let mut model = PowerLawRegression::new();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.state(), FitState::Converged);
        assert!((model.alpha - 2.0).abs() < 1e-4);
        assert!((model.beta - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_infinite_ratio_fails_the_whole_fit() {
        // An infinite ratio passes the positivity mask and makes every
        // cost evaluation non-finite, so the fit cannot converge on the
        // remaining rows
        let (mut x, y) = power_data(2.0, 0.5, 20);
        x[[4, 0]] = f64::INFINITY;

        let mut model = PowerLawRegression::new();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.state(), FitState::Failed);
        assert!(model.alpha.is_nan());
        assert!(model.beta.is_nan());
    }

    #[test]
    fn test_single_valid_row_fails() {
        let x = Array2::from_shape_vec((2, 1), vec![0.5, -1.0]).unwrap();
        let y = Array1::from_vec(vec![1.0, 2.0]);

        let mut model = PowerLawRegression::new();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.state(), FitState::Failed);
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let model = PowerLawRegression::new();
        assert_eq!(model.state(), FitState::Unfit);

        let x = Array2::from_shape_vec((1, 1), vec![0.5]).unwrap();
        assert!(matches!(model.predict(&x), Err(ModelError::NotFitted)));
    }

    #[test]
    fn test_initial_guess_already_optimal() {
        // y = 1.0 * r^0.5 is the starting point itself
        let (x, y) = power_data(1.0, 0.5, 15);

        let mut model = PowerLawRegression::new();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.state(), FitState::Converged);
        assert!((model.alpha - 1.0).abs() < 1e-6);
        assert!((model.beta - 0.5).abs() < 1e-6);
    }
}
