//! In-memory record store
//!
//! Backs the `memory` records backend and the test suites. Contents are lost
//! when the process exits.

use super::{
    validate, ExpenseRecord, ExpenseUpdate, NewExpense, RecordFilter, RecordResult, RecordStore,
    RecordStoreError,
};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Record store held in process memory
#[derive(Default)]
pub struct InMemoryRecordStore {
    /// Insertion order
    records: RwLock<Vec<ExpenseRecord>>,
}

impl InMemoryRecordStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records across all owners
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(&self, owner_id: &str, expense: NewExpense) -> RecordResult<ExpenseRecord> {
        validate(&expense.text, expense.amount)?;

        let record = ExpenseRecord {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            text: expense.text.trim().to_string(),
            amount: expense.amount,
            category: expense.category,
            date: expense.date,
            created_at: Utc::now(),
        };

        self.records.write().await.push(record.clone());
        debug!(user_id = %owner_id, id = %record.id, "Record created");
        Ok(record)
    }

    async fn find_many(
        &self,
        owner_id: &str,
        filter: &RecordFilter,
    ) -> RecordResult<Vec<ExpenseRecord>> {
        let records = self.records.read().await;
        // Newest insertion first, then a stable sort keeps that order within equal keys
        let mut found: Vec<ExpenseRecord> = records
            .iter()
            .rev()
            .filter(|r| r.user_id == owner_id && filter.contains(r.date))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(found)
    }

    async fn update(
        &self,
        id: &str,
        owner_id: &str,
        update: ExpenseUpdate,
    ) -> RecordResult<ExpenseRecord> {
        validate(&update.text, update.amount)?;

        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id && r.user_id == owner_id)
            .ok_or_else(|| RecordStoreError::NotFound(id.to_string()))?;

        record.text = update.text.trim().to_string();
        record.amount = update.amount;
        record.category = update.category;
        record.date = update.date;

        debug!(user_id = %owner_id, id = %id, "Record updated");
        Ok(record.clone())
    }

    async fn delete(&self, id: &str, owner_id: &str) -> RecordResult<()> {
        let mut records = self.records.write().await;
        let position = records
            .iter()
            .position(|r| r.id == id && r.user_id == owner_id)
            .ok_or_else(|| RecordStoreError::NotFound(id.to_string()))?;

        records.remove(position);
        debug!(user_id = %owner_id, id = %id, "Record deleted");
        Ok(())
    }
}
