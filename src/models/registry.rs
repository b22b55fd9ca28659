//! Benchmark model registry
//!
//! The thirteen slippage model families evaluated by the harness. Each
//! entry pairs a display name with the feature columns the family
//! consumes and a factory producing a fresh, unfitted estimator. Folds
//! never share an estimator: the harness calls the factory once per fit.

use crate::features::Feature;

use super::forest::ForestConfig;
use super::{
    ElasticNetRegression, GbdtRegressor, GradientBoostingRegressor, KnnRegressor,
    LinearRegression, PolynomialRegression, PowerLawRegression, RandomForestRegressor, Regressor,
    RidgeRegression, SvrRegressor,
};

/// One benchmark entry: a named model family bound to its feature subset
#[derive(Clone)]
pub struct ModelSpec {
    pub name: &'static str,
    pub features: &'static [Feature],
    factory: fn() -> Box<dyn Regressor>,
}

impl ModelSpec {
    /// Construct a fresh, unfitted estimator for this family
    pub fn build(&self) -> Box<dyn Regressor> {
        (self.factory)()
    }

    /// Column positions of this family's features in the engineered matrix
    pub fn columns(&self) -> Vec<usize> {
        Feature::indices(self.features)
    }
}

/// The full benchmark lineup, in reporting vocabulary.
///
/// Functional-form baselines fit a single engineered column; the
/// machine-learning families see all eight.
pub fn registry() -> Vec<ModelSpec> {
    vec![
        ModelSpec {
            name: "Square-root",
            features: &[Feature::SqrtXv],
            factory: || Box::new(LinearRegression::new(false)),
        },
        ModelSpec {
            name: "Linear x/V",
            features: &[Feature::XOverV],
            factory: || Box::new(LinearRegression::new(false)),
        },
        ModelSpec {
            name: "Logarithmic",
            features: &[Feature::LogX],
            factory: || Box::new(LinearRegression::new(true)),
        },
        ModelSpec {
            name: "Quadratic",
            features: &[Feature::Size],
            factory: || Box::new(PolynomialRegression::new(2)),
        },
        ModelSpec {
            name: "Poly x/V^2",
            features: &[Feature::XOverV],
            factory: || Box::new(PolynomialRegression::new(2)),
        },
        ModelSpec {
            name: "PowerLaw x/V",
            features: &[Feature::XOverV],
            factory: || Box::new(PowerLawRegression::new()),
        },
        ModelSpec {
            name: "ElasticNet",
            features: &Feature::ALL,
            factory: || Box::new(ElasticNetRegression::new(1.0, 0.5)),
        },
        ModelSpec {
            name: "Ridge",
            features: &Feature::ALL,
            factory: || Box::new(RidgeRegression::new(1.0)),
        },
        ModelSpec {
            name: "RandomForest",
            features: &Feature::ALL,
            factory: || Box::new(RandomForestRegressor::new(ForestConfig::default())),
        },
        ModelSpec {
            name: "GradientBoosting",
            features: &Feature::ALL,
            factory: || Box::new(GradientBoostingRegressor::default()),
        },
        ModelSpec {
            name: "KNN",
            features: &Feature::ALL,
            factory: || Box::new(KnnRegressor::new(5)),
        },
        ModelSpec {
            name: "SVR",
            features: &Feature::ALL,
            factory: || Box::new(SvrRegressor::new(1.0, 0.1)),
        },
        ModelSpec {
            name: "GBDT",
            features: &Feature::ALL,
            factory: || Box::new(GbdtRegressor::default()),
        },
    ]
}
