//! # Slippage Bench - Cross-validated market-impact model comparison
//!
//! This library benchmarks candidate models of execution slippage against
//! each other on simulated fill data. The pipeline:
//!
//! - Discover and load enhanced slippage CSV files
//! - Aggregate records into per-file, per-size buckets
//! - Engineer impact features (sqrt(x/V), x/V, log x, book covariates)
//! - Cross-validate thirteen model families with file-disjoint folds
//! - Rank families by mean held-out MSE

pub mod data;
pub mod features;
pub mod ml;
pub mod models;
pub mod pipeline;

pub use data::types::{FeatureFrame, SizeBucket, SlippageRecord};
pub use features::engineering::{Feature, FeatureEngine};
pub use ml::cross_validation::CrossValidator;
pub use ml::harness::{Harness, ModelScore};
pub use ml::metrics::Metrics;
pub use models::{FitState, PowerLawRegression, Regressor};
