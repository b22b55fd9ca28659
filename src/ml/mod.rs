//! Cross-validation, scoring and reporting

pub mod cross_validation;
pub mod harness;
pub mod metrics;
pub mod report;

pub use cross_validation::{CVScores, CVSplit, CrossValidator};
pub use harness::{EvalError, Harness, ModelScore};
pub use metrics::Metrics;
