use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Loading the sales table
// ---------------------------------------------------------------------------

/// Failure to turn a source file into a [`crate::data::model::SalesDataset`].
///
/// Fatal to the session: the UI shows it in the status line and keeps the
/// previously loaded dataset (if any).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("source is missing the '{column}' column")]
    MissingColumn { column: &'static str },

    #[error("row {row}, column '{column}': {message}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        message: String,
    },

    #[error("order id '{0}' appears more than once")]
    DuplicateOrderId(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// Failure to obtain a prediction from a [`crate::predict::Predictor`].
#[derive(Debug, Error)]
pub enum PredictError {
    /// The feature vector's names or order differ from the training schema.
    #[error("feature vector does not match the model: expected [{}], got [{}]", expected.join(", "), actual.join(", "))]
    EncodingMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("cannot access model file {path}: {source}")]
    ModelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model file is malformed: {0}")]
    ModelFormat(#[from] serde_json::Error),

    #[error("model file is malformed: {0}")]
    InvalidModel(String),

    #[error("model has not been trained")]
    Untrained,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}
