//! Error types for tally-cache

use thiserror::Error;

/// Cache error type
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend refused or failed the command
    #[error("backend error: {0}")]
    Backend(String),

    /// Backend did not answer within the configured timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Backend could not be reached at all
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Payload could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    /// Whether the error means the backend itself is unhealthy
    /// (as opposed to a bad payload).
    #[must_use]
    pub fn is_backend_failure(&self) -> bool {
        !matches!(self, CacheError::Serialization(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CacheError>;
