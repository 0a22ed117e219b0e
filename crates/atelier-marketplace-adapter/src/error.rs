//! Error types for the marketplace adapter

use thiserror::Error;

/// Result type alias using AdapterError
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors surfaced by the marketplace proxy
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Caller exceeded the request quota for the rolling window
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// The backend does not serve the requested endpoint
    #[error("Unknown endpoint '{0}'")]
    UnknownEndpoint(String),

    /// The upstream marketplace request failed
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdapterError {
    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Upstream(_))
    }
}
