//! Records - External expense record store
//!
//! The dialogue engine only reaches records through [`RecordStore`]:
//! - `create`, `find_many`, `update`, `delete`, all scoped to an owner id
//! - Cross-owner access is rejected by the store with [`RecordStoreError::NotFound`]
//!
//! Two implementations ship with the crate: [`InMemoryRecordStore`] and
//! [`SqliteRecordStore`].

use crate::category::Category;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::InMemoryRecordStore;
pub use sqlite_store::SqliteRecordStore;

/// Record store error
#[derive(Debug, Error)]
pub enum RecordStoreError {
    /// No record with this id belongs to the owner
    #[error("record not found: {0}")]
    NotFound(String),

    /// Rejected input (empty text, non-positive amount)
    #[error("invalid record: {0}")]
    Invalid(String),

    /// Storage failure
    #[error("storage error: {0}")]
    Backend(String),
}

/// Result type for record store operations
pub type RecordResult<T> = std::result::Result<T, RecordStoreError>;

/// A stored expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Opaque record id
    pub id: String,
    /// Owner
    pub user_id: String,
    /// Description
    pub text: String,
    /// Amount spent
    pub amount: f64,
    /// Category
    pub category: Category,
    /// Day of the purchase
    pub date: NaiveDate,
    /// Insertion time
    pub created_at: DateTime<Utc>,
}

/// Fields for a new record
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// Description
    pub text: String,
    /// Amount spent
    pub amount: f64,
    /// Category
    pub category: Category,
    /// Day of the purchase
    pub date: NaiveDate,
}

/// Replacement values for an existing record
///
/// Every field is written; callers carry unchanged values over from the original.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseUpdate {
    /// Description
    pub text: String,
    /// Amount spent
    pub amount: f64,
    /// Category
    pub category: Category,
    /// Day of the purchase
    pub date: NaiveDate,
}

/// Inclusive date range for `find_many`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Earliest date (inclusive)
    pub from: Option<NaiveDate>,
    /// Latest date (inclusive)
    pub to: Option<NaiveDate>,
}

impl RecordFilter {
    /// No filtering
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Dates between `from` and `to`, both inclusive
    #[must_use]
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Whether a date falls inside the range
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Permanent expense storage
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store a new record for `owner_id`
    async fn create(&self, owner_id: &str, expense: NewExpense) -> RecordResult<ExpenseRecord>;

    /// Records of `owner_id`, newest date first (ties: newest insertion first)
    async fn find_many(&self, owner_id: &str, filter: &RecordFilter)
        -> RecordResult<Vec<ExpenseRecord>>;

    /// Replace the fields of a record owned by `owner_id`
    async fn update(
        &self,
        id: &str,
        owner_id: &str,
        update: ExpenseUpdate,
    ) -> RecordResult<ExpenseRecord>;

    /// Delete a record owned by `owner_id`
    async fn delete(&self, id: &str, owner_id: &str) -> RecordResult<()>;
}

/// Shared input checks for every store
pub(crate) fn validate(text: &str, amount: f64) -> RecordResult<()> {
    if text.trim().is_empty() {
        return Err(RecordStoreError::Invalid("description is empty".to_string()));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(RecordStoreError::Invalid(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}
