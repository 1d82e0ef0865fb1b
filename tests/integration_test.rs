//! Integration tests for Tally
//!
//! These tests drive the dialogue engine through its public turn boundary:
//! - tally-cache: session state over a failing primary backend
//! - tally-core: add flow, listing and smart delete end to end
//! - records: SQLite persistence across reopen

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tally_cache::{CacheBackend, CacheClient, CacheConfig, CacheError};
use tally_core::{
    Category, DialogueEngine, FixedClock, InMemoryRecordStore, RecordFilter, RecordStore,
    SqliteRecordStore, TurnRequest, TurnResponse,
};
use tally_llm::DisabledGenerator;

const USER: &str = "alice";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 15).unwrap()
}

fn engine(cache: Arc<CacheClient>, records: Arc<dyn RecordStore>) -> DialogueEngine {
    DialogueEngine::new(cache, records, Arc::new(DisabledGenerator))
        .with_clock(Arc::new(FixedClock(today())))
}

async fn say(engine: &DialogueEngine, message: &str) -> TurnResponse {
    engine.handle_turn(TurnRequest::new(USER, message)).await
}

/// Walks the natural-language shortcut through to a saved record
async fn add_lunch(engine: &DialogueEngine) {
    let reply = say(engine, "spent $12 on lunch").await;
    assert!(reply.response_text.contains("$12.00"), "{}", reply.response_text);

    let reply = say(engine, "Food").await;
    assert!(reply.response_text.contains("When was this"));

    let reply = say(engine, "today").await;
    assert!(reply.response_text.contains("August 15, 2026"));
    assert!(!reply.record_changed);

    let reply = say(engine, "yes").await;
    assert!(reply.record_changed, "{}", reply.response_text);
}

/// Primary backend that never answers
struct DownBackend;

#[async_trait]
impl CacheBackend for DownBackend {
    fn name(&self) -> &str {
        "down"
    }

    async fn ping(&self) -> tally_cache::Result<()> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn get(&self, _key: &str) -> tally_cache::Result<Option<String>> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: Option<&str>, _ttl: Duration) -> tally_cache::Result<()> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

// ============================================================================
// Dialogue end to end
// ============================================================================

#[tokio::test]
async fn test_add_list_and_delete_in_memory() {
    let records = Arc::new(InMemoryRecordStore::new());
    let engine = engine(Arc::new(CacheClient::memory_only()), records.clone());

    add_lunch(&engine).await;

    let stored = records.find_many(USER, &RecordFilter::all()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].text, "lunch");
    assert_eq!(stored[0].amount, 12.0);
    assert_eq!(stored[0].category, Category::Food);
    assert_eq!(stored[0].date, today());

    let reply = say(&engine, "show expenses").await;
    assert!(reply.response_text.contains("lunch"));
    assert!(!reply.record_changed);

    let reply = say(&engine, "delete expense from today").await;
    assert!(reply.response_text.contains("Delete this expense?"));

    let reply = say(&engine, "yes").await;
    assert!(reply.record_changed);
    assert!(records.is_empty().await);
}

#[tokio::test]
async fn test_other_users_records_are_invisible() {
    let records = Arc::new(InMemoryRecordStore::new());
    let engine = engine(Arc::new(CacheClient::memory_only()), records.clone());

    add_lunch(&engine).await;

    let reply = engine
        .handle_turn(TurnRequest::new("bob", "show my expenses"))
        .await;
    assert!(reply.response_text.contains("don't have any expenses"));
}

// ============================================================================
// Cache fallback
// ============================================================================

#[tokio::test]
async fn test_dialogue_survives_unreachable_cache() {
    let cache = Arc::new(CacheClient::new(
        Arc::new(DownBackend),
        CacheConfig::new().with_probe_timeout(Duration::from_millis(50)),
    ));
    let records = Arc::new(InMemoryRecordStore::new());
    let engine = engine(Arc::clone(&cache), records.clone());

    add_lunch(&engine).await;
    assert_eq!(records.len().await, 1);

    let status = cache.status().await;
    assert_eq!(status.primary.as_deref(), Some("down"));
    assert!(status.fallback_engaged);

    let history = engine.history().history(USER, "default").await.unwrap();
    assert!(!history.is_empty());
}

// ============================================================================
// SQLite persistence
// ============================================================================

#[tokio::test]
async fn test_sqlite_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tally.db");

    {
        let store = Arc::new(SqliteRecordStore::new(&path).await.unwrap());
        let engine = engine(Arc::new(CacheClient::memory_only()), store);
        add_lunch(&engine).await;
    }

    let reopened = SqliteRecordStore::new(&path).await.unwrap();
    let stored = reopened.find_many(USER, &RecordFilter::all()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].text, "lunch");
    assert_eq!(stored[0].category, Category::Food);
    assert_eq!(stored[0].date, today());
}
