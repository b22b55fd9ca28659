//! Regression model families
//!
//! Every benchmarked family implements the same fit/predict interface so
//! the evaluation harness can treat a closed-form linear fit, an
//! iterative curve fit and an ensemble identically. Models are constructed
//! fresh per CV fold via the registry's factories.

use ndarray::{Array1, Array2};
use thiserror::Error;

pub mod boosting;
pub mod forest;
pub mod gbdt;
pub mod knn;
pub mod linear;
pub mod power_law;
pub mod registry;
pub mod regularization;
pub mod svr;
pub mod tree;

pub use boosting::GradientBoostingRegressor;
pub use forest::RandomForestRegressor;
pub use gbdt::GbdtRegressor;
pub use knn::KnnRegressor;
pub use linear::{LinearRegression, PolynomialRegression};
pub use power_law::{FitState, PowerLawRegression};
pub use registry::{registry, ModelSpec};
pub use regularization::{ElasticNetRegression, RidgeRegression};
pub use svr::SvrRegressor;
pub use tree::{RegressionTree, TreeConfig};

/// Errors that can occur while fitting or predicting
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Matrix is singular and cannot be solved")]
    SingularMatrix,

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Model has not been fitted yet")]
    NotFitted,

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("External library error: {0}")]
    Library(String),
}

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Common interface over every benchmarked model family.
///
/// `fit` learns from a training matrix and target; `predict` maps a
/// matrix with the same column layout to one prediction per row. A fit
/// that cannot produce usable parameters either returns an error
/// (aborting the benchmark) or, for the power-law family, degrades to
/// NaN predictions as a documented recovery path.
pub trait Regressor: Send {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()>;

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>>;
}
