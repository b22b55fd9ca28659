//! Slippage model benchmark
//!
//! Discovers enhanced slippage CSV files in a directory, aggregates them
//! into per-file size buckets and ranks thirteen regression families by
//! grouped cross-validated test error.
//!
//! ```bash
//! slippage_bench --data-dir ./data --folds 5
//! ```

use clap::Parser;
use slippage_bench::ml::report;
use slippage_bench::pipeline;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "slippage_bench")]
#[command(about = "Cross-validated benchmark of market-impact slippage models")]
struct Cli {
    /// Directory containing *_enhanced_slippage.csv files
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Number of cross-validation folds (clamped to the file count)
    #[arg(short, long, default_value = "5")]
    folds: usize,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the report table
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env().add_directive("slippage_bench=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    info!(
        "Benchmarking slippage models on {:?} with {} folds",
        cli.data_dir, cli.folds
    );

    let scores = pipeline::run(&cli.data_dir, cli.folds)?;
    report::print_report(&scores);

    if let Some(best) = scores.first() {
        info!("Best family by mean test MSE: {}", best.model);
    }

    Ok(())
}
