//! Ranked benchmark report
//!
//! Formats aggregated model scores into the final table, ascending by
//! mean test MSE. NaN rows (families whose fits failed on every fold
//! they could not handle) sort to the bottom instead of disappearing.

use std::cmp::Ordering;

use colored::Colorize;
use tabled::{Table, Tabled};

use super::harness::ModelScore;

#[derive(Tabled)]
struct ScoreRow {
    #[tabled(rename = "model")]
    model: String,
    #[tabled(rename = "mean_test_mse")]
    mean_test_mse: String,
    #[tabled(rename = "std_test_mse")]
    std_test_mse: String,
    #[tabled(rename = "mean_test_r2")]
    mean_test_r2: String,
    #[tabled(rename = "std_test_r2")]
    std_test_r2: String,
}

/// Sort scores ascending by mean test MSE, NaN last
pub fn rank(mut scores: Vec<ModelScore>) -> Vec<ModelScore> {
    scores.sort_by(|a, b| {
        match (a.mean_test_mse.is_nan(), b.mean_test_mse.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => a
                .mean_test_mse
                .partial_cmp(&b.mean_test_mse)
                .unwrap_or(Ordering::Equal),
        }
    });
    scores
}

/// Render the scores as a text table
pub fn render(scores: &[ModelScore]) -> String {
    let rows: Vec<ScoreRow> = scores
        .iter()
        .map(|s| ScoreRow {
            model: s.model.clone(),
            mean_test_mse: format!("{:.6e}", s.mean_test_mse),
            std_test_mse: format!("{:.6e}", s.std_test_mse),
            mean_test_r2: format!("{:.4}", s.mean_test_r2),
            std_test_r2: format!("{:.4}", s.std_test_r2),
        })
        .collect();

    Table::new(rows).to_string()
}

/// Print the ranked table to stdout with a section header
pub fn print_report(scores: &[ModelScore]) {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Slippage Model Benchmark".bold().blue());
    println!("{}", "=".repeat(60).blue());
    println!("{}", render(scores));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(model: &str, mse: f64) -> ModelScore {
        ModelScore {
            model: model.to_string(),
            mean_test_mse: mse,
            std_test_mse: 0.0,
            mean_test_r2: 0.5,
            std_test_r2: 0.1,
        }
    }

    #[test]
    fn test_rank_ascending_with_nan_last() {
        let ranked = rank(vec![
            score("mid", 0.5),
            score("failed", f64::NAN),
            score("best", 0.1),
            score("worst", 0.9),
        ]);

        let order: Vec<&str> = ranked.iter().map(|s| s.model.as_str()).collect();
        assert_eq!(order, vec!["best", "mid", "worst", "failed"]);

        // Non-decreasing over the finite prefix
        for pair in ranked.windows(2) {
            if pair[0].mean_test_mse.is_nan() || pair[1].mean_test_mse.is_nan() {
                continue;
            }
            assert!(pair[0].mean_test_mse <= pair[1].mean_test_mse);
        }
    }

    #[test]
    fn test_render_has_columns_and_nan_rows() {
        let table = render(&[score("PowerLaw x/V", f64::NAN), score("Ridge", 2e-6)]);

        assert!(table.contains("model"));
        assert!(table.contains("mean_test_mse"));
        assert!(table.contains("std_test_r2"));
        assert!(table.contains("PowerLaw x/V"));
        assert!(table.contains("NaN"));
        assert!(table.contains("2.000000e-6"));
    }
}
