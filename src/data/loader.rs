//! Input file discovery and CSV loading
//!
//! The upstream tool writes one enhanced CSV per traded token and date,
//! named `<token>_<date>_enhanced_slippage.csv`. This loader discovers
//! those files in a data directory and deserializes the recognized
//! columns, leaving extras (timestamp, vol_ratio) untouched.

use super::error::{DataError, DataResult};
use super::types::SlippageRecord;
use csv::Reader;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name suffix produced by the upstream slippage tool
pub const INPUT_SUFFIX: &str = "_enhanced_slippage.csv";

/// Columns every input file must carry
const REQUIRED_COLUMNS: [&str; 7] = [
    "size",
    "slippage",
    "spread",
    "depth",
    "imbalance",
    "volatility",
    "hour_of_day",
];

/// Data loader for enhanced slippage CSV files
pub struct DataLoader;

impl DataLoader {
    /// Discover input files in a directory, sorted lexicographically.
    ///
    /// The sorted position of each file becomes its group identifier
    /// downstream, so discovery order must be deterministic. Zero matches
    /// is a fatal configuration error.
    pub fn discover_files<P: AsRef<Path>>(data_dir: P) -> DataResult<Vec<PathBuf>> {
        let data_dir = data_dir.as_ref();
        let entries = std::fs::read_dir(data_dir).map_err(|source| DataError::ReadDir {
            dir: data_dir.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| DataError::ReadDir {
                dir: data_dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.ends_with(INPUT_SUFFIX))
                .unwrap_or(false);
            if matches && path.is_file() {
                files.push(path);
            }
        }

        files.sort();

        if files.is_empty() {
            return Err(DataError::NoInputFiles(data_dir.to_path_buf()));
        }

        info!("Discovered {} slippage files in {:?}", files.len(), data_dir);
        Ok(files)
    }

    /// Load all records from one enhanced slippage file.
    ///
    /// The header is checked for the required columns up front so a
    /// malformed file fails with the offending column name rather than a
    /// row-level parse error.
    pub fn load_records<P: AsRef<Path>>(path: P) -> DataResult<Vec<SlippageRecord>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DataError::Open {
            file: path.to_path_buf(),
            source,
        })?;

        let mut reader = Reader::from_reader(file);

        let headers = reader.headers().map_err(|source| DataError::Parse {
            file: path.to_path_buf(),
            source,
        })?;
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|header| header == column) {
                return Err(DataError::MissingColumn {
                    file: path.to_path_buf(),
                    column: column.to_string(),
                });
            }
        }

        let mut records = Vec::new();
        for result in reader.deserialize() {
            let record: SlippageRecord = result.map_err(|source| DataError::Parse {
                file: path.to_path_buf(),
                source,
            })?;
            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const HEADER: &str =
        "timestamp,size,slippage,vol_ratio,spread,depth,imbalance,volatility,hour_of_day";

    fn write_file(path: &Path, rows: &[&str]) {
        let mut file = File::create(path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
    }

    #[test]
    fn test_load_records_skips_extra_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("btc_2024-01-01_enhanced_slippage.csv");
        write_file(
            &path,
            &[
                "1700000000,100,0.0011,0.01,0.5,10000,0.2,,14",
                "1700000000,200,0.0019,0.02,0.5,10000,0.2,0.013,14",
            ],
        );

        let records = DataLoader::load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].size, 100.0);
        assert_eq!(records[0].volatility, None);
        assert_eq!(records[1].volatility, Some(0.013));
        assert_eq!(records[1].hour_of_day, 14.0);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad_enhanced_slippage.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "timestamp,size,slippage,spread,imbalance,volatility,hour_of_day").unwrap();
        writeln!(file, "1700000000,100,0.0011,0.5,0.2,0.01,14").unwrap();

        let err = DataLoader::load_records(&path).unwrap_err();
        match err {
            DataError::MissingColumn { column, .. } => assert_eq!(column, "depth"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_discover_files_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        for name in [
            "eth_2024-01-02_enhanced_slippage.csv",
            "btc_2024-01-01_enhanced_slippage.csv",
            "notes.txt",
        ] {
            write_file(&dir.path().join(name), &[]);
        }

        let files = DataLoader::discover_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "btc_2024-01-01_enhanced_slippage.csv",
                "eth_2024-01-02_enhanced_slippage.csv",
            ]
        );
    }

    #[test]
    fn test_discover_files_empty_dir_errors() {
        let dir = tempdir().unwrap();
        let err = DataLoader::discover_files(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::NoInputFiles(_)));
    }
}
