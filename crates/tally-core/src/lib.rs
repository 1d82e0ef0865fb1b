//! Tally Core - Conversational expense ledger
//!
//! This crate provides the dialogue layer of the Tally assistant:
//! - Sessions: typed add/edit/pending-confirmation state over the resilient cache
//! - Intent: ordered rule cascade from free text to intent plus slots
//! - Engine: the dialogue state machine and the turn boundary
//! - Lookup: date phrases to candidate records for smart delete/edit
//! - Records: the external record store trait with in-memory and SQLite stores
//! - Advisor / Analysis: category suggestions, advice and local spending summaries

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod advisor;
pub mod analysis;
pub mod category;
pub mod clock;
pub mod engine;
pub mod error;
pub mod intent;
pub mod lookup;
pub mod parse;
pub mod records;
pub mod session;

pub use advisor::Advisor;
pub use category::{Category, CategoryReply};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{DialogueEngine, EngineConfig, TurnRequest, TurnResponse};
pub use error::{format_error_for_chat, Error, Result, UserFriendlyError};
pub use intent::{classify, Classification, Intent};
pub use lookup::{extract_date_phrase, find_candidates, DateQuery};
pub use records::{
    ExpenseRecord, ExpenseUpdate, InMemoryRecordStore, NewExpense, RecordFilter, RecordStore,
    RecordStoreError, SqliteRecordStore,
};
pub use session::{
    AddExpenseSession, AddStep, ChatMessage, ChatRole, ConversationLog, EditExpenseSession,
    EditField, ExpenseRef, PendingConfirmation, PendingOperation, SessionKey, SessionKind,
    SessionStore,
};
