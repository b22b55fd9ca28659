//! Core data types for the slippage benchmark
//!
//! This module defines the structures flowing through the pipeline:
//! - SlippageRecord: one raw row of an enhanced slippage CSV
//! - SizeBucket: per-file aggregate over all records sharing an order size
//! - FeatureFrame: feature matrix, target vector and group labels for CV

use ndarray::{Array1, Array2};
use serde::Deserialize;

/// One raw record from an enhanced slippage file.
///
/// Input files carry additional columns (timestamp, vol_ratio) which are
/// not deserialized. `volatility` is rolling and undefined for the first
/// snapshot of a session; the upstream tool writes those cells empty, so
/// the field is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct SlippageRecord {
    /// Simulated order size (base units)
    pub size: f64,
    /// Execution slippage relative to mid price
    pub slippage: f64,
    /// Bid-ask spread at snapshot time
    pub spread: f64,
    /// Visible book depth on the traded side
    pub depth: f64,
    /// Order book imbalance (bid_vol - ask_vol) / (bid_vol + ask_vol)
    pub imbalance: f64,
    /// Rolling mid-price volatility, empty while the window is warming up
    pub volatility: Option<f64>,
    /// Snapshot hour of day (0-23)
    pub hour_of_day: f64,
}

/// Per-file aggregate: mean covariates over all records at one order size.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeBucket {
    /// Position of the source file in sorted discovery order
    pub file_id: usize,
    /// Order size shared by the aggregated records
    pub size: f64,
    pub slippage: f64,
    pub spread: f64,
    pub depth: f64,
    pub imbalance: f64,
    /// NaN when every underlying record had missing volatility
    pub volatility: f64,
    pub hour_of_day: f64,
}

impl SizeBucket {
    /// Size relative to available depth
    pub fn x_over_v(&self) -> f64 {
        self.size / self.depth
    }

    /// Square root of size over depth
    pub fn sqrt_xv(&self) -> f64 {
        (self.size / self.depth).sqrt()
    }

    /// Natural log of the order size
    pub fn log_x(&self) -> f64 {
        self.size.ln()
    }
}

/// Feature matrix, target vector and group labels ready for evaluation.
///
/// Rows correspond one-to-one across `x`, `y` and `groups`.
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    /// Feature matrix (n_samples x n_features)
    pub x: Array2<f64>,
    /// Target vector (slippage per row)
    pub y: Array1<f64>,
    /// Source-file identifier per row, used for group-disjoint CV
    pub groups: Vec<usize>,
    /// Column names matching `x`
    pub feature_names: Vec<String>,
}

impl FeatureFrame {
    pub fn new(
        x: Array2<f64>,
        y: Array1<f64>,
        groups: Vec<usize>,
        feature_names: Vec<String>,
    ) -> Self {
        assert_eq!(x.nrows(), y.len(), "X rows must match y length");
        assert_eq!(x.nrows(), groups.len(), "X rows must match group labels");
        Self {
            x,
            y,
            groups,
            feature_names,
        }
    }

    /// Get number of samples
    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    /// Get number of features
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Get a subset of feature columns by indices
    pub fn select_columns(&self, indices: &[usize]) -> Array2<f64> {
        self.x.select(ndarray::Axis(1), indices)
    }

    /// Number of distinct group labels
    pub fn n_groups(&self) -> usize {
        let mut seen: Vec<usize> = self.groups.clone();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}
