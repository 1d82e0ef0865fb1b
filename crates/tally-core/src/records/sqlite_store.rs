//! SQLite record store
//!
//! # Features
//!
//! - Embedded database, no external service
//! - Schema created on start
//! - Dates stored as `YYYY-MM-DD` text so ordering by column matches calendar order

use super::{
    validate, ExpenseRecord, ExpenseUpdate, NewExpense, RecordFilter, RecordResult, RecordStore,
    RecordStoreError,
};
use crate::category::Category;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id, user_id, text, amount, category, date, created_at";

/// SQLite-backed record store
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open (or create) a database file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or the schema cannot be applied.
    pub async fn new(path: impl AsRef<Path>) -> RecordResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RecordStoreError::Backend(format!("Failed to create database directory: {}", e))
            })?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .map_err(|e| RecordStoreError::Backend(format!("Invalid SQLite path: {}", e)))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| RecordStoreError::Backend(format!("Failed to connect to SQLite: {}", e)))?;

        let store = Self { pool };
        store.init_schema().await?;

        info!(path = %path.display(), "SQLite record store initialized");
        Ok(store)
    }

    /// Default database location (~/.tally/expenses.db)
    pub fn default_path() -> RecordResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            RecordStoreError::Backend("Could not determine home directory".to_string())
        })?;
        Ok(home.join(".tally").join("expenses.db"))
    }

    async fn init_schema(&self) -> RecordResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS expenses (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                text TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| RecordStoreError::Backend(format!("Failed to create expenses table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_expenses_user_date ON expenses(user_id, date)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| RecordStoreError::Backend(format!("Failed to create index: {}", e)))?;

        debug!("SQLite record schema initialized");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> RecordResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RecordStoreError::Backend(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    async fn fetch_one(&self, id: &str, owner_id: &str) -> RecordResult<ExpenseRecord> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM expenses WHERE id = ? AND user_id = ?",
            SELECT_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RecordStoreError::Backend(format!("Failed to load record: {}", e)))?
        .ok_or_else(|| RecordStoreError::NotFound(id.to_string()))?;

        row_to_record(&row)
    }
}

fn row_to_record(row: &SqliteRow) -> RecordResult<ExpenseRecord> {
    let column = |e: sqlx::Error| RecordStoreError::Backend(format!("Malformed row: {}", e));

    let category: String = row.try_get("category").map_err(column)?;
    let date: String = row.try_get("date").map_err(column)?;
    let created_at: String = row.try_get("created_at").map_err(column)?;

    Ok(ExpenseRecord {
        id: row.try_get("id").map_err(column)?,
        user_id: row.try_get("user_id").map_err(column)?,
        text: row.try_get("text").map_err(column)?,
        amount: row.try_get("amount").map_err(column)?,
        category: category.parse().unwrap_or(Category::Other),
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| RecordStoreError::Backend(format!("Malformed date '{}': {}", date, e)))?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                RecordStoreError::Backend(format!("Malformed timestamp '{}': {}", created_at, e))
            })?,
    })
}

fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create(&self, owner_id: &str, expense: NewExpense) -> RecordResult<ExpenseRecord> {
        validate(&expense.text, expense.amount)?;

        let record = ExpenseRecord {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            text: expense.text.trim().to_string(),
            amount: expense.amount,
            category: expense.category,
            date: expense.date,
            // Stored with microsecond precision
            created_at: Utc::now().trunc_subsecs(6),
        };

        sqlx::query(
            r#"
            INSERT INTO expenses (id, user_id, text, amount, category, date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.text)
        .bind(record.amount)
        .bind(record.category.as_str())
        .bind(record.date.format("%Y-%m-%d").to_string())
        .bind(timestamp(record.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RecordStoreError::Backend(format!("Failed to insert record: {}", e)))?;

        debug!(user_id = %owner_id, id = %record.id, "Record created");
        Ok(record)
    }

    async fn find_many(
        &self,
        owner_id: &str,
        filter: &RecordFilter,
    ) -> RecordResult<Vec<ExpenseRecord>> {
        let from = filter.from.map(|d| d.format("%Y-%m-%d").to_string());
        let to = filter.to.map(|d| d.format("%Y-%m-%d").to_string());

        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM expenses
            WHERE user_id = ?
              AND (? IS NULL OR date >= ?)
              AND (? IS NULL OR date <= ?)
            ORDER BY date DESC, created_at DESC, rowid DESC
            "#,
            SELECT_COLUMNS
        ))
        .bind(owner_id)
        .bind(from.clone())
        .bind(from)
        .bind(to.clone())
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RecordStoreError::Backend(format!("Failed to query records: {}", e)))?;

        rows.iter().map(row_to_record).collect()
    }

    async fn update(
        &self,
        id: &str,
        owner_id: &str,
        update: ExpenseUpdate,
    ) -> RecordResult<ExpenseRecord> {
        validate(&update.text, update.amount)?;

        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET text = ?, amount = ?, category = ?, date = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(update.text.trim())
        .bind(update.amount)
        .bind(update.category.as_str())
        .bind(update.date.format("%Y-%m-%d").to_string())
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| RecordStoreError::Backend(format!("Failed to update record: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(RecordStoreError::NotFound(id.to_string()));
        }

        debug!(user_id = %owner_id, id = %id, "Record updated");
        self.fetch_one(id, owner_id).await
    }

    async fn delete(&self, id: &str, owner_id: &str) -> RecordResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RecordStoreError::Backend(format!("Failed to delete record: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(RecordStoreError::NotFound(id.to_string()));
        }

        debug!(user_id = %owner_id, id = %id, "Record deleted");
        Ok(())
    }
}
