use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy for the data layer
// ---------------------------------------------------------------------------

/// A measure cell that is still not a number after cleaning.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("'{value}' is not a number")]
pub struct NormalizationError {
    /// The original cell text, before cleaning.
    pub value: String,
}

/// Fatal problems while loading a dataset. No partial dataset is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Row {row}: invalid date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("Row {row}, column '{column}': {source}")]
    InvalidNumber {
        row: usize,
        column: String,
        #[source]
        source: NormalizationError,
    },

    #[error("Row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },
}

/// Failures while writing the filtered view out.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
