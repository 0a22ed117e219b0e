//! Error types for the workflow service

use thiserror::Error;

/// Result type alias using ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur in the workflow service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The workflow has a run in flight; edits and new runs are refused
    #[error("Workflow '{0}' has a run in flight")]
    WorkflowBusy(String),

    /// A row was not found in the given table
    #[error("Row '{id}' not found in table '{table}'")]
    RowNotFound { table: String, id: String },

    /// A row is missing its id field
    #[error("Row in table '{0}' has no string 'id' field")]
    MissingRowId(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
