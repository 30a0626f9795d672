//! Error types for the EMA tabulator

use thiserror::Error;

/// Errors that can occur while tabulating a survey export
#[derive(Debug, Error)]
pub enum TabulateError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Failed to decode value: {0}")]
    DecodeError(String),

    #[error("Duplicate entry at pivot: ping {ping_id}, question {question_id}")]
    PivotConflict {
        ping_id: String,
        question_id: String,
    },

    #[error("No subject tables survived the per-subject loop")]
    EmptyAggregate,
}
