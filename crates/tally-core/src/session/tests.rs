use super::*;

fn store() -> SessionStore {
    SessionStore::new(Arc::new(CacheClient::memory_only()))
}

fn add_session() -> AddExpenseSession {
    let mut session = AddExpenseSession::at(AddStep::Category);
    session.description = Some("Coffee".to_string());
    session.amount = Some(4.5);
    session.suggested_category = Some(Category::Food);
    session
}

fn expense_ref(id: &str) -> ExpenseRef {
    ExpenseRef {
        id: id.to_string(),
        text: "Lunch".to_string(),
        amount: 12.0,
        category: Category::Food,
        date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
    }
}

#[test]
fn test_keys_are_unique_per_kind_and_owner() {
    let add = SessionKey::new("u1", "c1", SessionKind::AddExpense);
    let edit = SessionKey::new("u1", "c1", SessionKind::EditExpense);
    let pending = SessionKey::new("u1", "c1", SessionKind::PendingConfirmation);
    let other_user = SessionKey::new("u2", "c1", SessionKind::AddExpense);
    let other_conversation = SessionKey::new("u1", "c2", SessionKind::AddExpense);

    let keys = [&add, &edit, &pending, &other_user, &other_conversation];
    for (i, a) in keys.iter().enumerate() {
        for b in keys.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
    assert_eq!(add.as_str(), "expense_conversation:u1:c1");
}

#[test]
fn test_key_escaping_prevents_separator_collisions() {
    // Without escaping both would be "expense_conversation:a:b:c"
    let left = SessionKey::new("a:b", "c", SessionKind::AddExpense);
    let right = SessionKey::new("a", "b:c", SessionKind::AddExpense);
    assert_ne!(left, right);

    let percent = SessionKey::new("a%3Ab", "c", SessionKind::AddExpense);
    assert_ne!(left, percent);
}

#[tokio::test]
async fn test_save_then_load_round_trip() {
    let store = store();
    let session = add_session();

    store.save("u1", "c1", &session).await.unwrap();
    let loaded: Option<AddExpenseSession> = store.load("u1", "c1").await.unwrap();
    assert_eq!(loaded, Some(session));

    // Other kinds stay absent
    let edit: Option<EditExpenseSession> = store.load("u1", "c1").await.unwrap();
    assert!(edit.is_none());
}

#[tokio::test]
async fn test_clear_twice_is_idempotent() {
    let store = store();
    store.save("u1", "c1", &add_session()).await.unwrap();

    store.clear("u1", "c1", SessionKind::AddExpense).await.unwrap();
    store.clear("u1", "c1", SessionKind::AddExpense).await.unwrap();

    let loaded: Option<AddExpenseSession> = store.load("u1", "c1").await.unwrap();
    assert!(loaded.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_session_expires_after_ttl() {
    let store = store();
    let pending =
        PendingConfirmation::new(PendingOperation::Delete, vec![expense_ref("r1")]).unwrap();
    store.save("u1", "c1", &pending).await.unwrap();

    tokio::time::advance(DEFAULT_SESSION_TTL - Duration::from_secs(1)).await;
    let before: Option<PendingConfirmation> = store.load("u1", "c1").await.unwrap();
    assert_eq!(before, Some(pending));

    tokio::time::advance(Duration::from_secs(2)).await;
    let after: Option<PendingConfirmation> = store.load("u1", "c1").await.unwrap();
    assert!(after.is_none());
}

#[tokio::test]
async fn test_saving_replaces_previous_edit_session() {
    let store = store();
    store
        .save("u1", "c1", &EditExpenseSession::for_record(&expense_ref("r1")))
        .await
        .unwrap();
    store
        .save("u1", "c1", &EditExpenseSession::for_record(&expense_ref("r2")))
        .await
        .unwrap();

    let loaded: EditExpenseSession = store.load("u1", "c1").await.unwrap().unwrap();
    assert_eq!(loaded.expense_id, "r2");
}

#[tokio::test]
async fn test_unreadable_session_is_discarded() {
    let cache = Arc::new(CacheClient::memory_only());
    let store = SessionStore::new(Arc::clone(&cache));
    let key = SessionKey::new("u1", "c1", SessionKind::AddExpense);
    cache
        .set(key.as_str(), Some("{\"step\":\"flying\"}"), DEFAULT_SESSION_TTL)
        .await
        .unwrap();

    let loaded: Option<AddExpenseSession> = store.load("u1", "c1").await.unwrap();
    assert!(loaded.is_none());
    assert_eq!(cache.get(key.as_str()).await.unwrap(), None);
}

#[test]
fn test_pending_confirmation_requires_candidates() {
    assert!(PendingConfirmation::new(PendingOperation::Delete, Vec::new()).is_none());

    let pending = PendingConfirmation::new(
        PendingOperation::Edit,
        vec![expense_ref("r1"), expense_ref("r2")],
    )
    .unwrap();
    assert_eq!(pending.candidate(2).map(|c| c.id.as_str()), Some("r2"));
    assert!(pending.candidate(0).is_none());
    assert!(pending.candidate(3).is_none());
}

#[test]
fn test_edit_field_names() {
    assert_eq!(EditField::from_name(" Amount "), Some(EditField::Amount));
    assert_eq!(EditField::from_name("text"), Some(EditField::Description));
    assert_eq!(EditField::from_name("date"), None);
}

#[tokio::test]
async fn test_conversation_log_is_capped() {
    let log = ConversationLog::new(Arc::new(CacheClient::memory_only()))
        .with_limits(DEFAULT_HISTORY_TTL, 4);

    for i in 0..3 {
        log.append("u1", "c1", &format!("q{}", i), &format!("a{}", i))
            .await
            .unwrap();
    }

    let history = log.history("u1", "c1").await.unwrap();
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["q1", "a1", "q2", "a2"]);
    assert_eq!(history[0].role, ChatRole::User);
    assert_eq!(history[1].role, ChatRole::Assistant);

    assert!(log.history("u1", "other").await.unwrap().is_empty());
}
