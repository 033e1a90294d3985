use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, filtering or aggregating student data.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The input file is missing or cannot be read.
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required column is absent after header normalisation.
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// The CSV reader rejected a record.
    #[error("malformed CSV: {0}")]
    Malformed(#[from] csv::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("invalid Arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// A Parquet column has a type the loader cannot interpret.
    #[error("column '{column}' has unsupported type {data_type}")]
    ColumnType { column: String, data_type: String },

    /// A JSON row is not shaped like a student record.
    #[error("row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    /// The active filters match no rows.
    #[error("No students match the selected filters. Please adjust your selections.")]
    EmptyResult,
}

impl DashboardError {
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DashboardError::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Whether the caller can recover by changing the filter selection.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DashboardError::EmptyResult)
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
