//! Data ingestion: file discovery, CSV loading, size-bucket aggregation

pub mod aggregate;
pub mod error;
pub mod loader;
pub mod types;

pub use aggregate::Aggregator;
pub use error::{DataError, DataResult};
pub use loader::{DataLoader, INPUT_SUFFIX};
pub use types::{FeatureFrame, SizeBucket, SlippageRecord};
