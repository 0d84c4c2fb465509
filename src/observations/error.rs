use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObservationError {
    #[error("Observation folder '{0}' does not exist")]
    MissingSource(PathBuf),

    #[error("Failed to list partition folder '{0}'")]
    ReadDir(PathBuf, #[source] std::io::Error),

    #[error("Failed to open partition file '{0}'")]
    PartitionOpen(PathBuf, #[source] std::io::Error),

    #[error("Failed to read partition file '{0}'")]
    ParquetRead(PathBuf, #[source] PolarsError),

    #[error("Columns of partition '{path}' collide on '{column}' after lowercasing")]
    ColumnNameCollision { path: PathBuf, column: String },

    #[error("Failed to merge partitions in '{folder}'")]
    PartitionMerge {
        folder: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("No observations found in '{0}'")]
    NoData(PathBuf),

    #[error("Required column '{column}' not found, columns present: {present:?}")]
    MissingDimension {
        column: String,
        present: Vec<String>,
    },

    #[error("No climate value column found, columns present: {present:?}")]
    NoValueColumn { present: Vec<String> },

    #[error("Ambiguous climate value column, candidates: {candidates:?}")]
    AmbiguousValueColumn { candidates: Vec<String> },

    #[error("Column 'date' has unsupported type {0}")]
    UnsupportedDateType(String),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
