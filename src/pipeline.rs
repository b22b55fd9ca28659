//! End-to-end benchmark pipeline
//!
//! Wires the stages together: discover input files, aggregate each into
//! size buckets, engineer features and hand the frame to the harness.
//! Lives in the library so integration tests drive the same code path
//! as the binary.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::data::{Aggregator, DataLoader};
use crate::features::FeatureEngine;
use crate::ml::{report, Harness, ModelScore};

/// Run the full benchmark over a directory of enhanced slippage files.
///
/// Returns the model scores ranked ascending by mean test MSE, NaN last.
pub fn run(data_dir: &Path, n_folds: usize) -> Result<Vec<ModelScore>> {
    let files = DataLoader::discover_files(data_dir)
        .with_context(|| format!("discovering slippage files in {:?}", data_dir))?;

    let mut buckets = Vec::new();
    for (file_id, path) in files.iter().enumerate() {
        let records =
            DataLoader::load_records(path).with_context(|| format!("loading {:?}", path))?;
        let file_buckets = Aggregator::aggregate_file(file_id, &records);
        info!(
            "{:?}: {} records -> {} size buckets",
            path.file_name().unwrap_or_default(),
            records.len(),
            file_buckets.len()
        );
        buckets.extend(file_buckets);
    }

    info!(
        "Aggregated {} bucket rows from {} files",
        buckets.len(),
        files.len()
    );

    let frame = FeatureEngine::build_frame(buckets);
    let scores = Harness::new(n_folds).evaluate(&frame)?;

    Ok(report::rank(scores))
}
