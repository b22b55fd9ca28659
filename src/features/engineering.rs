//! Feature engineering for the slippage benchmark
//!
//! Turns aggregated size buckets into a model-ready feature frame.
//! Derived impact-curve columns:
//! - sqrt_xV: square root of size over depth
//! - x_over_V: size over depth (participation ratio)
//! - log_x: natural log of order size

use crate::data::{FeatureFrame, SizeBucket};
use ndarray::{Array1, Array2};
use tracing::info;

/// Column selector for the engineered feature matrix.
///
/// Every model spec names its inputs as a slice of these, so the mapping
/// from model to columns is explicit rather than a runtime name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    SqrtXv,
    XOverV,
    /// ln(size); not guarded against size <= 0, matching the permissive
    /// upstream pipeline (its size grid starts well above zero)
    LogX,
    Spread,
    Depth,
    Imbalance,
    Volatility,
    HourOfDay,
    /// Raw order size, stored for the quadratic fit only
    Size,
}

impl Feature {
    /// The multivariate subset: every engineered column except raw size.
    pub const ALL: [Feature; 8] = [
        Feature::SqrtXv,
        Feature::XOverV,
        Feature::LogX,
        Feature::Spread,
        Feature::Depth,
        Feature::Imbalance,
        Feature::Volatility,
        Feature::HourOfDay,
    ];

    /// Column position in the engineered matrix
    pub const fn index(self) -> usize {
        match self {
            Feature::SqrtXv => 0,
            Feature::XOverV => 1,
            Feature::LogX => 2,
            Feature::Spread => 3,
            Feature::Depth => 4,
            Feature::Imbalance => 5,
            Feature::Volatility => 6,
            Feature::HourOfDay => 7,
            Feature::Size => 8,
        }
    }

    /// Column name matching the upstream tool's vocabulary
    pub const fn name(self) -> &'static str {
        match self {
            Feature::SqrtXv => "sqrt_xV",
            Feature::XOverV => "x_over_V",
            Feature::LogX => "log_x",
            Feature::Spread => "spread",
            Feature::Depth => "depth",
            Feature::Imbalance => "imbalance",
            Feature::Volatility => "volatility",
            Feature::HourOfDay => "hour_of_day",
            Feature::Size => "size",
        }
    }

    /// Map a selector slice to column indices
    pub fn indices(features: &[Feature]) -> Vec<usize> {
        features.iter().map(|f| f.index()).collect()
    }
}

/// Total stored columns (the 8 model features plus raw size)
pub const N_COLUMNS: usize = 9;

/// Feature engineering engine
pub struct FeatureEngine;

impl FeatureEngine {
    /// Drop buckets with non-positive depth.
    ///
    /// The ratio features divide by depth, so such rows carry no usable
    /// signal. Returns the surviving buckets and the dropped count;
    /// re-applying to already-filtered buckets drops nothing.
    pub fn filter_positive_depth(buckets: Vec<SizeBucket>) -> (Vec<SizeBucket>, usize) {
        let before = buckets.len();
        let kept: Vec<SizeBucket> = buckets.into_iter().filter(|b| b.depth > 0.0).collect();
        let dropped = before - kept.len();
        (kept, dropped)
    }

    /// Build the feature frame from aggregated buckets.
    ///
    /// Filters non-positive-depth rows (logging the count), derives the
    /// impact-curve columns, and assembles X, y and group labels. Column
    /// order follows `Feature::index`.
    pub fn build_frame(buckets: Vec<SizeBucket>) -> FeatureFrame {
        let (kept, dropped) = Self::filter_positive_depth(buckets);
        info!("Dropped {} bucket rows with non-positive depth", dropped);

        let n_samples = kept.len();
        let mut x_data = Vec::with_capacity(n_samples * N_COLUMNS);
        let mut y_data = Vec::with_capacity(n_samples);
        let mut groups = Vec::with_capacity(n_samples);

        for bucket in &kept {
            x_data.extend_from_slice(&[
                bucket.sqrt_xv(),
                bucket.x_over_v(),
                bucket.log_x(),
                bucket.spread,
                bucket.depth,
                bucket.imbalance,
                bucket.volatility,
                bucket.hour_of_day,
                bucket.size,
            ]);
            y_data.push(bucket.slippage);
            groups.push(bucket.file_id);
        }

        let x = Array2::from_shape_vec((n_samples, N_COLUMNS), x_data)
            .expect("row-major feature buffer matches (n_samples, N_COLUMNS)");
        let y = Array1::from_vec(y_data);
        let feature_names = [
            Feature::SqrtXv,
            Feature::XOverV,
            Feature::LogX,
            Feature::Spread,
            Feature::Depth,
            Feature::Imbalance,
            Feature::Volatility,
            Feature::HourOfDay,
            Feature::Size,
        ]
        .iter()
        .map(|f| f.name().to_string())
        .collect();

        FeatureFrame::new(x, y, groups, feature_names)
    }
}
