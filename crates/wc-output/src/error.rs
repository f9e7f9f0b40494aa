use std::path::PathBuf;

use thiserror::Error;

/// Failures while persisting snapshots, metrics or events.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("output directory {0} does not exist or is not a directory")]
    NotADirectory(PathBuf),

    #[error("output I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "parquet")]
    #[error("Arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "parquet")]
    #[error("Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

pub type OutputResult<T> = Result<T, OutputError>;
