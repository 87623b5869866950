//! Error types for Stridewise

use thiserror::Error;

/// Errors that can occur while loading data or running the pipeline
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid threshold configuration: {0}")]
    InvalidThreshold(String),
}
