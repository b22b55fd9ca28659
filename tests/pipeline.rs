//! End-to-end pipeline tests against synthetic enhanced slippage files.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tempfile::TempDir;

use slippage_bench::data::{Aggregator, DataLoader};
use slippage_bench::pipeline;

const HEADER: &str =
    "timestamp,size,slippage,vol_ratio,spread,depth,imbalance,volatility,hour_of_day";

/// Write one synthetic file: 5 size buckets x 20 snapshots, slippage
/// following an exact square-root law plus small Gaussian noise. The
/// first `volatility_warmup` rows have empty volatility cells, the way
/// the upstream tool writes a rolling window that has not filled yet.
fn write_square_root_file(dir: &Path, name: &str, depth: f64, seed: u64, volatility_warmup: usize) {
    let mut out = File::create(dir.join(name)).unwrap();
    writeln!(out, "{}", HEADER).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.002).unwrap();

    let mut row = 0;
    for step in 1..=5 {
        let size = 100.0 * step as f64;
        for _ in 0..20 {
            let slippage = 2.0 * (size / depth).sqrt() + noise.sample(&mut rng);
            let volatility = if row < volatility_warmup {
                String::new()
            } else {
                format!("{:.6}", 0.01 + 0.001 * step as f64)
            };
            writeln!(
                out,
                "2024-03-05T10:{:02}:00Z,{},{:.8},1.05,0.5,{},0.02,{},10",
                row % 60,
                size,
                slippage,
                depth,
                volatility
            )
            .unwrap();
            row += 1;
        }
    }
}

#[test]
fn test_square_root_family_wins_on_square_root_data() {
    let dir = TempDir::new().unwrap();
    write_square_root_file(dir.path(), "btc_enhanced_slippage.csv", 10_000.0, 7, 3);
    write_square_root_file(dir.path(), "eth_enhanced_slippage.csv", 12_000.0, 8, 3);

    // Two source files, so the requested 5 folds clamp down to 2
    let scores = pipeline::run(dir.path(), 5).unwrap();

    assert_eq!(scores.len(), 13);

    // Ranked ascending by mean test MSE, NaN only at the bottom
    for pair in scores.windows(2) {
        if pair[0].mean_test_mse.is_nan() {
            assert!(pair[1].mean_test_mse.is_nan());
        } else if !pair[1].mean_test_mse.is_nan() {
            assert!(pair[0].mean_test_mse <= pair[1].mean_test_mse);
        }
    }

    // Only the depth-normalized square-root forms transfer across files
    let winner = &scores[0];
    assert!(
        winner.model == "Square-root" || winner.model == "PowerLaw x/V",
        "unexpected winner {}",
        winner.model
    );
    assert!(winner.mean_test_mse < 1e-5);
}

#[test]
fn test_aggregation_tags_buckets_by_file() {
    let dir = TempDir::new().unwrap();

    let mut a = File::create(dir.path().join("a_enhanced_slippage.csv")).unwrap();
    writeln!(a, "{}", HEADER).unwrap();
    writeln!(a, "t0,100,0.001,1.0,0.4,9000,0.0,0.010,9").unwrap();
    writeln!(a, "t1,100,0.003,1.0,0.6,11000,0.2,,9").unwrap();
    writeln!(a, "t2,200,0.004,1.0,0.5,10000,0.1,0.020,10").unwrap();

    let mut b = File::create(dir.path().join("b_enhanced_slippage.csv")).unwrap();
    writeln!(b, "{}", HEADER).unwrap();
    writeln!(b, "t0,300,0.005,1.0,0.5,10000,0.1,0.030,11").unwrap();
    writeln!(b, "t1,400,0.006,1.0,0.5,10000,0.1,0.040,12").unwrap();

    let files = DataLoader::discover_files(dir.path()).unwrap();
    assert_eq!(files.len(), 2);

    let mut buckets = Vec::new();
    for (file_id, path) in files.iter().enumerate() {
        let records = DataLoader::load_records(path).unwrap();
        buckets.extend(Aggregator::aggregate_file(file_id, &records));
    }

    assert_eq!(buckets.len(), 4);
    assert_eq!(
        buckets.iter().map(|b| b.file_id).collect::<Vec<_>>(),
        vec![0, 0, 1, 1]
    );
    assert_eq!(
        buckets.iter().map(|b| b.size).collect::<Vec<_>>(),
        vec![100.0, 200.0, 300.0, 400.0]
    );

    let first = &buckets[0];
    assert!((first.slippage - 0.002).abs() < 1e-12);
    assert!((first.spread - 0.5).abs() < 1e-12);
    assert!((first.depth - 10_000.0).abs() < 1e-9);
    assert!((first.imbalance - 0.1).abs() < 1e-12);
    // The empty volatility cell is excluded from the mean
    assert!((first.volatility - 0.010).abs() < 1e-12);
    assert!((first.hour_of_day - 9.0).abs() < 1e-12);
}

#[test]
fn test_all_empty_volatility_aborts_run() {
    let dir = TempDir::new().unwrap();

    // Volatility never leaves warm-up: every cell is empty, the bucket
    // means come out NaN, and the all-feature families see a NaN column
    write_square_root_file(dir.path(), "btc_enhanced_slippage.csv", 10_000.0, 7, 100);
    write_square_root_file(dir.path(), "eth_enhanced_slippage.csv", 12_000.0, 8, 100);

    let err = pipeline::run(dir.path(), 5).unwrap_err();
    let rendered = format!("{:#}", err);
    assert!(rendered.contains("GBDT"), "{rendered}");
    assert!(rendered.contains("non-finite"), "{rendered}");
}

#[test]
fn test_missing_column_aborts_run() {
    let dir = TempDir::new().unwrap();

    let mut bad = File::create(dir.path().join("bad_enhanced_slippage.csv")).unwrap();
    writeln!(
        bad,
        "timestamp,size,slippage,vol_ratio,spread,imbalance,volatility,hour_of_day"
    )
    .unwrap();
    writeln!(bad, "t0,100,0.001,1.0,0.4,0.1,0.01,9").unwrap();

    let err = pipeline::run(dir.path(), 5).unwrap_err();
    assert!(format!("{:#}", err).contains("depth"));
}

#[test]
fn test_empty_directory_aborts_run() {
    let dir = TempDir::new().unwrap();

    let err = pipeline::run(dir.path(), 5).unwrap_err();
    assert!(format!("{:#}", err).contains("_enhanced_slippage.csv"));
}
