//! Data layer error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering or loading input files
#[derive(Error, Debug)]
pub enum DataError {
    #[error("no files ending in '_enhanced_slippage.csv' found in {0:?}")]
    NoInputFiles(PathBuf),

    #[error("failed to read directory {dir:?}: {source}")]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open {file:?}: {source}")]
    Open {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {file:?}: {source}")]
    Parse {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{file:?} is missing required column '{column}'")]
    MissingColumn { file: PathBuf, column: String },
}

/// Result type alias for data operations
pub type DataResult<T> = Result<T, DataError>;
