//! Size-bucket aggregation
//!
//! Raw files repeat the same simulated order sizes across many snapshots.
//! Aggregation collapses each file to one row per distinct size, averaging
//! the covariates, so downstream models see one observation per
//! (file, size) pair.

use super::types::{SizeBucket, SlippageRecord};
use std::cmp::Ordering;

/// Groups raw records into per-size buckets
pub struct Aggregator;

impl Aggregator {
    /// Aggregate one file's records into buckets sorted by size.
    ///
    /// Grouping is by exact size value. Missing volatility values are
    /// excluded from that bucket's mean; a bucket with no finite
    /// volatility at all gets NaN, which flows downstream like any other
    /// undefined value.
    pub fn aggregate_file(file_id: usize, records: &[SlippageRecord]) -> Vec<SizeBucket> {
        let mut sorted: Vec<&SlippageRecord> = records.iter().collect();
        sorted.sort_by(|a, b| a.size.partial_cmp(&b.size).unwrap_or(Ordering::Equal));

        let mut buckets = Vec::new();
        let mut start = 0;
        while start < sorted.len() {
            let size = sorted[start].size;
            let mut end = start + 1;
            while end < sorted.len() && sorted[end].size == size {
                end += 1;
            }
            buckets.push(Self::bucket_from_group(file_id, size, &sorted[start..end]));
            start = end;
        }
        buckets
    }

    fn bucket_from_group(file_id: usize, size: f64, group: &[&SlippageRecord]) -> SizeBucket {
        let n = group.len() as f64;

        let volatilities: Vec<f64> = group
            .iter()
            .filter_map(|r| r.volatility)
            .filter(|v| v.is_finite())
            .collect();
        let volatility = if volatilities.is_empty() {
            f64::NAN
        } else {
            volatilities.iter().sum::<f64>() / volatilities.len() as f64
        };

        SizeBucket {
            file_id,
            size,
            slippage: group.iter().map(|r| r.slippage).sum::<f64>() / n,
            spread: group.iter().map(|r| r.spread).sum::<f64>() / n,
            depth: group.iter().map(|r| r.depth).sum::<f64>() / n,
            imbalance: group.iter().map(|r| r.imbalance).sum::<f64>() / n,
            volatility,
            hour_of_day: group.iter().map(|r| r.hour_of_day).sum::<f64>() / n,
        }
    }
}
