//! Session State Store
//!
//! Typed persistence of dialogue state on top of the resilient cache.
//!
//! # Session kinds
//!
//! - [`AddExpenseSession`]: guided add-flow, one step at a time
//! - [`EditExpenseSession`]: edit-flow for one stored record
//! - [`PendingConfirmation`]: candidates awaiting a yes/no/number/"all" reply
//!
//! Every kind lives under its own [`SessionKey`], built from
//! `(user id, conversation id, kind)`. The store only serializes sessions;
//! it attaches no meaning to their contents.

use crate::category::Category;
use crate::error::Result;
use crate::records::ExpenseRecord;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tally_cache::CacheClient;
use tracing::{debug, warn};

/// Default TTL for every session kind (30 minutes)
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(1800);

/// Default TTL for the conversation log (24 hours)
pub const DEFAULT_HISTORY_TTL: Duration = Duration::from_secs(86_400);

/// Default number of messages kept in the conversation log
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

// ============================================================================
// Keys
// ============================================================================

/// The three kinds of dialogue session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// Guided add-expense flow
    AddExpense,
    /// Edit-expense flow
    EditExpense,
    /// Pending smart delete/edit confirmation
    PendingConfirmation,
}

impl SessionKind {
    /// Key namespace for this kind
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        match self {
            SessionKind::AddExpense => "expense_conversation",
            SessionKind::EditExpense => "edit_conversation",
            SessionKind::PendingConfirmation => "pending_confirmation",
        }
    }
}

/// Cache key for one `(user, conversation, kind)` tuple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    /// Key for a dialogue session
    #[must_use]
    pub fn new(user_id: &str, conversation_id: &str, kind: SessionKind) -> Self {
        Self::build(kind.namespace(), user_id, conversation_id)
    }

    /// Key for the conversation log
    #[must_use]
    pub fn history(user_id: &str, conversation_id: &str) -> Self {
        Self::build("conversation", user_id, conversation_id)
    }

    fn build(namespace: &str, user_id: &str, conversation_id: &str) -> Self {
        Self(format!(
            "{}:{}:{}",
            namespace,
            escape_component(user_id),
            escape_component(conversation_id)
        ))
    }

    /// Key string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `%` and `:` are escaped so separators inside ids cannot forge another key
fn escape_component(raw: &str) -> String {
    raw.replace('%', "%25").replace(':', "%3A")
}

/// A value persisted as a dialogue session of a fixed kind
pub trait DialogueSession: Serialize + DeserializeOwned + Send + Sync {
    /// Kind this session is stored under
    const KIND: SessionKind;
}

// ============================================================================
// Session types
// ============================================================================

/// Steps of the add-flow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddStep {
    /// Waiting for what was bought
    Description,
    /// Waiting for how much
    Amount,
    /// Waiting for a category (or "yes" to the suggestion)
    Category,
    /// Waiting for when
    Date,
    /// Waiting for yes/no before writing
    Confirmation,
}

/// Guided add-expense state
///
/// Fields fill in step order; only a `Confirmation`-step session is ever written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddExpenseSession {
    /// Current step
    pub step: AddStep,
    /// Description
    pub description: Option<String>,
    /// Amount
    pub amount: Option<f64>,
    /// Category offered to the user
    pub suggested_category: Option<Category>,
    /// Chosen category
    pub category: Option<Category>,
    /// Purchase date
    pub date: Option<NaiveDate>,
    /// A large amount seen once, waiting to be entered again
    #[serde(default)]
    pub unconfirmed_amount: Option<f64>,
    /// When the flow started
    pub started_at: DateTime<Utc>,
}

impl AddExpenseSession {
    /// Empty session at `step`
    #[must_use]
    pub fn at(step: AddStep) -> Self {
        Self {
            step,
            description: None,
            amount: None,
            suggested_category: None,
            category: None,
            date: None,
            unconfirmed_amount: None,
            started_at: Utc::now(),
        }
    }
}

impl DialogueSession for AddExpenseSession {
    const KIND: SessionKind = SessionKind::AddExpense;
}

/// Editable record fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditField {
    /// Record text
    Description,
    /// Record amount
    Amount,
    /// Record category
    Category,
}

impl EditField {
    /// Field name as typed by users
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EditField::Description => "description",
            EditField::Amount => "amount",
            EditField::Category => "category",
        }
    }

    /// Parse a field name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "description" | "text" => Some(EditField::Description),
            "amount" => Some(EditField::Amount),
            "category" => Some(EditField::Category),
            _ => None,
        }
    }
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edit-flow state for one record
///
/// `field == None` is the selecting-field state, `Some` is awaiting-value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditExpenseSession {
    /// Record being edited
    pub expense_id: String,
    /// Text before the edit
    pub original_text: String,
    /// Amount before the edit
    pub original_amount: f64,
    /// Category before the edit
    pub original_category: Category,
    /// Date before the edit
    pub original_date: NaiveDate,
    /// Field picked by the user, if any
    #[serde(default)]
    pub field: Option<EditField>,
    /// When the flow started
    pub started_at: DateTime<Utc>,
}

impl EditExpenseSession {
    /// Start editing `record`
    #[must_use]
    pub fn for_record(record: &ExpenseRef) -> Self {
        Self {
            expense_id: record.id.clone(),
            original_text: record.text.clone(),
            original_amount: record.amount,
            original_category: record.category,
            original_date: record.date,
            field: None,
            started_at: Utc::now(),
        }
    }
}

impl DialogueSession for EditExpenseSession {
    const KIND: SessionKind = SessionKind::EditExpense;
}

/// Snapshot of a record carried inside sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRef {
    /// Record id
    pub id: String,
    /// Description
    pub text: String,
    /// Amount
    pub amount: f64,
    /// Category
    pub category: Category,
    /// Purchase date
    pub date: NaiveDate,
}

impl From<&ExpenseRecord> for ExpenseRef {
    fn from(record: &ExpenseRecord) -> Self {
        Self {
            id: record.id.clone(),
            text: record.text.clone(),
            amount: record.amount,
            category: record.category,
            date: record.date,
        }
    }
}

/// Operation awaiting confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingOperation {
    /// Delete one or all candidates
    Delete,
    /// Pick one candidate to edit
    Edit,
}

/// Candidates found by a smart delete/edit, awaiting the user's pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    /// What happens once resolved
    pub operation: PendingOperation,
    /// Matching records (never empty)
    candidates: Vec<ExpenseRef>,
}

impl PendingConfirmation {
    /// Build a confirmation; `None` when there is nothing to confirm
    #[must_use]
    pub fn new(operation: PendingOperation, candidates: Vec<ExpenseRef>) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }
        Some(Self {
            operation,
            candidates,
        })
    }

    /// Matching records
    #[must_use]
    pub fn candidates(&self) -> &[ExpenseRef] {
        &self.candidates
    }

    /// Candidate by 1-based index
    #[must_use]
    pub fn candidate(&self, index: usize) -> Option<&ExpenseRef> {
        index.checked_sub(1).and_then(|i| self.candidates.get(i))
    }
}

impl DialogueSession for PendingConfirmation {
    const KIND: SessionKind = SessionKind::PendingConfirmation;
}

// ============================================================================
// Store
// ============================================================================

/// Typed session persistence over the shared cache client
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<CacheClient>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store with the default 30 minute TTL
    #[must_use]
    pub fn new(cache: Arc<CacheClient>) -> Self {
        Self {
            cache,
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Override the session TTL
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Load a session; absent, expired and cleared sessions are all `None`
    pub async fn load<S: DialogueSession>(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<Option<S>> {
        let key = SessionKey::new(user_id, conversation_id, S::KIND);
        match self.cache.get_json::<S>(key.as_str()).await {
            Ok(session) => Ok(session),
            Err(tally_cache::CacheError::Serialization(e)) => {
                // Unreadable state (older layout, manual edits) is dropped, not surfaced
                warn!(key = %key, error = %e, "Discarding unreadable session");
                self.cache.delete(key.as_str()).await?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Save a session, replacing any previous one of the same kind
    pub async fn save<S: DialogueSession>(
        &self,
        user_id: &str,
        conversation_id: &str,
        session: &S,
    ) -> Result<()> {
        let key = SessionKey::new(user_id, conversation_id, S::KIND);
        self.cache.set_json(key.as_str(), session, self.ttl).await?;
        debug!(key = %key, "Session saved");
        Ok(())
    }

    /// Clear a session. Clearing an absent session is a no-op.
    pub async fn clear(
        &self,
        user_id: &str,
        conversation_id: &str,
        kind: SessionKind,
    ) -> Result<()> {
        let key = SessionKey::new(user_id, conversation_id, kind);
        self.cache.delete(key.as_str()).await?;
        debug!(key = %key, "Session cleared");
        Ok(())
    }
}

// ============================================================================
// Conversation log
// ============================================================================

/// Author of a logged message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The user
    User,
    /// The assistant
    Assistant,
}

/// One logged message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub role: ChatRole,
    /// Text
    pub content: String,
    /// When it was logged
    pub timestamp: DateTime<Utc>,
}

/// Capped per-conversation message history
#[derive(Clone)]
pub struct ConversationLog {
    cache: Arc<CacheClient>,
    ttl: Duration,
    limit: usize,
}

impl ConversationLog {
    /// Create a log with the default TTL and cap
    #[must_use]
    pub fn new(cache: Arc<CacheClient>) -> Self {
        Self {
            cache,
            ttl: DEFAULT_HISTORY_TTL,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Override TTL and cap
    #[must_use]
    pub fn with_limits(mut self, ttl: Duration, limit: usize) -> Self {
        self.ttl = ttl;
        self.limit = limit.max(2);
        self
    }

    /// Logged messages, oldest first
    pub async fn history(&self, user_id: &str, conversation_id: &str) -> Result<Vec<ChatMessage>> {
        let key = SessionKey::history(user_id, conversation_id);
        Ok(self
            .cache
            .get_json::<Vec<ChatMessage>>(key.as_str())
            .await?
            .unwrap_or_default())
    }

    /// Append one exchange, dropping the oldest messages past the cap
    pub async fn append(
        &self,
        user_id: &str,
        conversation_id: &str,
        user_message: &str,
        response: &str,
    ) -> Result<()> {
        let key = SessionKey::history(user_id, conversation_id);
        let mut messages = self.history(user_id, conversation_id).await?;
        let now = Utc::now();
        messages.push(ChatMessage {
            role: ChatRole::User,
            content: user_message.to_string(),
            timestamp: now,
        });
        messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: response.to_string(),
            timestamp: now,
        });

        if messages.len() > self.limit {
            let excess = messages.len() - self.limit;
            messages.drain(..excess);
        }

        self.cache
            .set_json(key.as_str(), &messages, self.ttl)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
