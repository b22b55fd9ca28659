//! Cross-validation utilities
//!
//! Group-aware K-Fold: every row carries a group id (the source file it
//! came from) and a group's rows land in exactly one test fold, so no
//! model is ever scored on a file it trained on.

use std::collections::BTreeMap;

/// Cross-validation split
#[derive(Debug, Clone)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Cross-validator
pub struct CrossValidator;

impl CrossValidator {
    /// Group K-Fold cross-validation splits
    ///
    /// Distinct groups are dealt to folds heaviest-first, each going to
    /// the currently lightest fold, which keeps fold sizes close even
    /// when files contribute very different row counts. Ties are broken
    /// by group id and then fold index, so splits are deterministic.
    ///
    /// # Arguments
    /// * `groups` - Group id of each row
    /// * `n_folds` - Number of folds; must not exceed the number of
    ///   distinct groups
    pub fn group_k_fold(groups: &[usize], n_folds: usize) -> Vec<CVSplit> {
        assert!(n_folds > 1, "n_folds must be > 1");

        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for &g in groups {
            *counts.entry(g).or_insert(0) += 1;
        }
        assert!(
            counts.len() >= n_folds,
            "need at least as many groups as folds"
        );

        let mut by_weight: Vec<(usize, usize)> = counts.into_iter().collect();
        by_weight.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut fold_sizes = vec![0usize; n_folds];
        let mut fold_of_group: BTreeMap<usize, usize> = BTreeMap::new();
        for (group, weight) in by_weight {
            // min_by_key returns the first minimum, i.e. the lowest fold index
            let lightest = fold_sizes
                .iter()
                .enumerate()
                .min_by_key(|&(_, size)| *size)
                .map(|(fold, _)| fold)
                .unwrap_or(0);
            fold_sizes[lightest] += weight;
            fold_of_group.insert(group, lightest);
        }

        let mut splits: Vec<CVSplit> = (0..n_folds)
            .map(|_| CVSplit {
                train_indices: Vec::new(),
                test_indices: Vec::new(),
            })
            .collect();

        // Rows are visited in order, so the index lists come out sorted
        for (row, g) in groups.iter().enumerate() {
            let fold = fold_of_group[g];
            for (f, split) in splits.iter_mut().enumerate() {
                if f == fold {
                    split.test_indices.push(row);
                } else {
                    split.train_indices.push(row);
                }
            }
        }

        splits
    }
}

/// Summary statistics for cross-validation scores
#[derive(Debug, Clone)]
pub struct CVScores {
    pub scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl CVScores {
    /// Calculate summary statistics from scores
    ///
    /// The standard deviation is the population form (divide by n). A
    /// NaN score poisons mean and std, which is how a failed fit stays
    /// visible in the final table.
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Self {
            scores,
            mean,
            std,
            min,
            max,
        }
    }

    /// Print a summary of the scores
    pub fn summary(&self) -> String {
        format!(
            "mean={:.6} (+/- {:.6}), min={:.6}, max={:.6}",
            self.mean,
            self.std * 2.0,
            self.min,
            self.max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_never_split_across_train_and_test() {
        let groups = vec![0, 0, 0, 1, 1, 2, 2, 3];
        let splits = CrossValidator::group_k_fold(&groups, 2);

        assert_eq!(splits.len(), 2);

        for split in &splits {
            let test_groups: Vec<usize> =
                split.test_indices.iter().map(|&i| groups[i]).collect();
            for &train_idx in &split.train_indices {
                assert!(
                    !test_groups.contains(&groups[train_idx]),
                    "group {} leaked into both sides",
                    groups[train_idx]
                );
            }
        }
    }

    #[test]
    fn test_every_row_tested_exactly_once() {
        let groups = vec![5, 5, 9, 9, 9, 2, 7, 7, 7, 7];
        let splits = CrossValidator::group_k_fold(&groups, 4);

        let mut seen = vec![0usize; groups.len()];
        for split in &splits {
            for &i in &split.test_indices {
                seen[i] += 1;
            }
            // Sorted output, no duplicates
            let mut sorted = split.test_indices.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted, split.test_indices);
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_heavy_groups_balance_folds() {
        // Group sizes 5, 3, 2, 2 into two folds: greedy assignment puts
        // the 5 alone until the ties push the last 2 back onto fold 0
        let mut groups = Vec::new();
        groups.extend(std::iter::repeat(0).take(5));
        groups.extend(std::iter::repeat(1).take(3));
        groups.extend(std::iter::repeat(2).take(2));
        groups.extend(std::iter::repeat(3).take(2));

        let splits = CrossValidator::group_k_fold(&groups, 2);
        assert_eq!(splits[0].test_indices.len(), 7);
        assert_eq!(splits[1].test_indices.len(), 5);
    }

    #[test]
    #[should_panic(expected = "at least as many groups")]
    fn test_more_folds_than_groups_panics() {
        let groups = vec![0, 0, 1, 1];
        CrossValidator::group_k_fold(&groups, 3);
    }

    #[test]
    fn test_cv_scores_population_std() {
        let scores = CVScores::from_scores(vec![1.0, 2.0, 3.0, 4.0]);
        assert!((scores.mean - 2.5).abs() < 1e-12);
        assert!((scores.std - 1.25f64.sqrt()).abs() < 1e-12);
        assert_eq!(scores.min, 1.0);
        assert_eq!(scores.max, 4.0);
    }

    #[test]
    fn test_cv_scores_nan_poisons_mean() {
        let scores = CVScores::from_scores(vec![1.0, f64::NAN, 3.0]);
        assert!(scores.mean.is_nan());
        assert!(scores.std.is_nan());
    }
}
