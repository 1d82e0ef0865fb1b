//! Dialogue engine core structure
//!
//! Contains the `DialogueEngine` struct and its builder methods.

use crate::advisor::Advisor;
use crate::clock::{Clock, SystemClock};
use crate::records::RecordStore;
use crate::session::{ConversationLog, SessionStore};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tally_cache::CacheClient;
use tally_llm::TextGenerator;
use tokio::sync::Mutex;

use super::config::EngineConfig;

/// Conversational state machine over sessions, records and the advisor
pub struct DialogueEngine {
    pub(crate) sessions: SessionStore,
    pub(crate) history: ConversationLog,
    pub(crate) records: Arc<dyn RecordStore>,
    pub(crate) advisor: Advisor,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: EngineConfig,
    /// One lock per `(user, conversation)` guarding load-mutate-save
    pub(crate) turn_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl DialogueEngine {
    /// Create an engine using the system clock and default settings
    #[must_use]
    pub fn new(
        cache: Arc<CacheClient>,
        records: Arc<dyn RecordStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(Arc::clone(&cache)),
            history: ConversationLog::new(Arc::clone(&cache)),
            advisor: Advisor::new(generator, cache),
            records,
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
            turn_locks: Arc::new(DashMap::new()),
        }
    }

    /// Set the engine configuration
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the clock used for "today"
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the TTL of every session kind
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.sessions = self.sessions.with_ttl(ttl);
        self
    }

    /// Override the conversation log TTL and cap
    #[must_use]
    pub fn with_history_limits(mut self, ttl: Duration, limit: usize) -> Self {
        self.history = self.history.with_limits(ttl, limit);
        self
    }

    /// Session store used by the engine
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Conversation log used by the engine
    #[must_use]
    pub fn history(&self) -> &ConversationLog {
        &self.history
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
