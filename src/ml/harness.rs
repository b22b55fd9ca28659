//! Cross-validation harness over the model registry
//!
//! Flattens (model family x fold) into one task list and fans it out to
//! rayon. Each task owns its slices and a freshly built estimator, so
//! nothing is shared mutably across the pool.

use ndarray::Array1;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use crate::data::FeatureFrame;
use crate::models::{registry, ModelError};

use super::cross_validation::{CVScores, CrossValidator};
use super::metrics::Metrics;

/// Errors from the evaluation harness
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Fold count must be at least 2, got {0}")]
    TooFewFolds(usize),

    #[error("Grouped cross-validation needs at least 2 source files, found {0}")]
    NotEnoughGroups(usize),

    #[error("Model {model} failed on fold {fold}: {source}")]
    Model {
        model: &'static str,
        fold: usize,
        source: ModelError,
    },
}

/// Aggregated cross-validated test scores for one model family
#[derive(Debug, Clone)]
pub struct ModelScore {
    pub model: String,
    pub mean_test_mse: f64,
    pub std_test_mse: f64,
    pub mean_test_r2: f64,
    pub std_test_r2: f64,
}

/// One fold's test metrics, tagged for regrouping after the parallel run
#[derive(Debug, Clone, Copy)]
struct FoldScore {
    model_idx: usize,
    mse: f64,
    r2: f64,
}

/// Benchmark harness
pub struct Harness {
    n_folds: usize,
}

impl Harness {
    pub fn new(n_folds: usize) -> Self {
        Self { n_folds }
    }

    /// Run every registered model family through grouped K-fold CV.
    ///
    /// The requested fold count is clamped to the number of distinct
    /// groups. Scores come back in registry order; a failed power-law
    /// fold contributes NaN metrics, any other estimator error aborts
    /// the whole evaluation.
    pub fn evaluate(&self, frame: &FeatureFrame) -> Result<Vec<ModelScore>, EvalError> {
        if self.n_folds < 2 {
            return Err(EvalError::TooFewFolds(self.n_folds));
        }

        let n_groups = frame.n_groups();
        if n_groups < 2 {
            return Err(EvalError::NotEnoughGroups(n_groups));
        }

        let n_folds = if self.n_folds > n_groups {
            warn!(
                "Requested {} folds but only {} source files; using {} folds",
                self.n_folds, n_groups, n_groups
            );
            n_groups
        } else {
            self.n_folds
        };

        let specs = registry();
        let splits = CrossValidator::group_k_fold(&frame.groups, n_folds);

        info!(
            "Evaluating {} model families with {}-fold grouped CV on {} rows from {} files",
            specs.len(),
            n_folds,
            frame.n_samples(),
            n_groups
        );

        let tasks: Vec<(usize, usize)> = (0..specs.len())
            .flat_map(|m| (0..splits.len()).map(move |f| (m, f)))
            .collect();

        let fold_scores: Vec<FoldScore> = tasks
            .par_iter()
            .map(|&(model_idx, fold_idx)| {
                let spec = &specs[model_idx];
                let split = &splits[fold_idx];

                let x = frame.select_columns(&spec.columns());
                let x_train = x.select(ndarray::Axis(0), &split.train_indices);
                let y_train = Array1::from_vec(
                    split.train_indices.iter().map(|&i| frame.y[i]).collect(),
                );
                let x_test = x.select(ndarray::Axis(0), &split.test_indices);
                let y_test = Array1::from_vec(
                    split.test_indices.iter().map(|&i| frame.y[i]).collect(),
                );

                let mut model = spec.build();
                model.fit(&x_train, &y_train).map_err(|source| EvalError::Model {
                    model: spec.name,
                    fold: fold_idx,
                    source,
                })?;
                let preds = model.predict(&x_test).map_err(|source| EvalError::Model {
                    model: spec.name,
                    fold: fold_idx,
                    source,
                })?;

                Ok(FoldScore {
                    model_idx,
                    mse: Metrics::mse(&y_test, &preds),
                    r2: Metrics::r2_score(&y_test, &preds),
                })
            })
            .collect::<Result<Vec<_>, EvalError>>()?;

        let mut per_model_mse: Vec<Vec<f64>> = vec![Vec::new(); specs.len()];
        let mut per_model_r2: Vec<Vec<f64>> = vec![Vec::new(); specs.len()];
        for score in fold_scores {
            per_model_mse[score.model_idx].push(score.mse);
            per_model_r2[score.model_idx].push(score.r2);
        }

        let mut results = Vec::with_capacity(specs.len());
        for (spec, (mses, r2s)) in specs
            .iter()
            .zip(per_model_mse.into_iter().zip(per_model_r2))
        {
            let mse = CVScores::from_scores(mses);
            let r2 = CVScores::from_scores(r2s);
            info!("{}: test MSE {}", spec.name, mse.summary());
            results.push(ModelScore {
                model: spec.name.to_string(),
                mean_test_mse: mse.mean,
                std_test_mse: mse.std,
                mean_test_r2: r2.mean,
                std_test_r2: r2.std,
            });
        }

        Ok(results)
    }
}
