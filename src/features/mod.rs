//! Feature engineering modules

pub mod engineering;

pub use engineering::{Feature, FeatureEngine, N_COLUMNS};
