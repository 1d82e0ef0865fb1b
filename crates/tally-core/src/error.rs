//! Error types for tally-core
//!
//! Every error that reaches the turn boundary is turned into a response string
//! through [`UserFriendlyError`]; none of them end the process.

use crate::records::RecordStoreError;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Session cache failure
    #[error("cache error: {0}")]
    Cache(#[from] tally_cache::CacheError),

    /// External record store failure
    #[error("record store error: {0}")]
    Records(#[from] RecordStoreError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for user-friendly error messages
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to recover
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::Cache(_) => "⚠️ I couldn't reach my conversation memory.".to_string(),
            Error::Records(RecordStoreError::NotFound(_)) => {
                "❌ That expense could not be found.".to_string()
            }
            Error::Records(_) => {
                "❌ Sorry, I couldn't reach your expense records right now.".to_string()
            }
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::Cache(_) | Error::Records(_) => {
                Some("💡 Please try again in a moment.".to_string())
            }
        }
    }
}

/// Render an error as a chat response
pub fn format_error_for_chat(error: &Error) -> String {
    match error.suggestion() {
        Some(suggestion) => format!("{}\n\n{}", error.user_message(), suggestion),
        None => error.user_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = Error::Records(RecordStoreError::NotFound("abc".to_string()));
        assert!(err.user_message().contains("could not be found"));
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_format_error_for_chat_hides_internals() {
        let err = Error::from(tally_cache::CacheError::Backend(
            "READONLY at 10.0.0.3:6379".to_string(),
        ));
        let text = format_error_for_chat(&err);
        assert!(!text.contains("10.0.0.3"));
        assert!(text.contains("try again"));
    }
}
