//! Engine configuration and the turn boundary types
//!
//! - `EngineConfig` for engine settings
//! - `TurnRequest` / `TurnResponse` exchanged with callers

use serde::{Deserialize, Serialize};

/// Conversation id used when the caller supplies none
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Dialogue engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Amounts above this need to be entered twice
    pub amount_warning_threshold: f64,
    /// How many recent expenses listings show (and numbered commands address)
    pub recent_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            amount_warning_threshold: 10_000.0,
            recent_limit: 5,
        }
    }
}

impl EngineConfig {
    /// Override the large-amount threshold
    #[must_use]
    pub fn with_amount_warning_threshold(mut self, threshold: f64) -> Self {
        self.amount_warning_threshold = threshold;
        self
    }

    /// Override the listing size
    #[must_use]
    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit.max(1);
        self
    }
}

/// One inbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRequest {
    /// Stable opaque user id
    pub user_id: String,
    /// Conversation id; `None` or empty means [`DEFAULT_CONVERSATION_ID`]
    pub conversation_id: Option<String>,
    /// Raw message text
    pub message: String,
}

impl TurnRequest {
    /// Create a request in the default conversation
    #[must_use]
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            conversation_id: None,
            message: message.into(),
        }
    }

    /// Set the conversation id
    #[must_use]
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Conversation id with the default applied
    #[must_use]
    pub fn conversation_id(&self) -> &str {
        self.conversation_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_CONVERSATION_ID)
    }
}

/// One outbound response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResponse {
    /// Text shown to the user
    pub response_text: String,
    /// Whether a record was created, updated or deleted this turn
    pub record_changed: bool,
    /// Conversation the turn belonged to
    pub conversation_id: String,
}
