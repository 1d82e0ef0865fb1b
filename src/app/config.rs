//! Application configuration types
//!
//! Contains every section of `config/default.toml`.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tally_core::EngineConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cache: CacheSettings,
    pub sessions: SessionSettings,
    pub llm: LlmSettings,
    pub records: RecordsSettings,
    pub engine: EngineConfig,
}

/// Empty strings in TOML or the environment mean "not set"
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Session cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub key_prefix: String,
    pub probe_timeout_ms: u64,
    pub command_timeout_ms: u64,
    pub fallback_retry_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            key_prefix: tally_cache::redis_backend::DEFAULT_PREFIX.to_string(),
            probe_timeout_ms: 500,
            command_timeout_ms: 2000,
            fallback_retry_secs: 60,
            sweep_interval_secs: 60,
        }
    }
}

impl CacheSettings {
    pub fn redis_url(&self) -> Option<&str> {
        non_empty(&self.redis_url)
    }

    pub fn fallback_retry_after(&self) -> Option<Duration> {
        (self.fallback_retry_secs > 0).then(|| Duration::from_secs(self.fallback_retry_secs))
    }
}

/// Session and history lifetimes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub ttl_secs: u64,
    pub history_ttl_secs: u64,
    pub history_limit: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: tally_core::session::DEFAULT_SESSION_TTL.as_secs(),
            history_ttl_secs: tally_core::session::DEFAULT_HISTORY_TTL.as_secs(),
            history_limit: tally_core::session::DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Text generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub enabled: bool,
    pub base_url: String,
    /// Falls back to `OPENAI_API_KEY`
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: tally_llm::openai::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: tally_llm::openai::DEFAULT_MODEL.to_string(),
            max_tokens: 500,
            temperature: 0.3,
            timeout_secs: 30,
        }
    }
}

impl LlmSettings {
    pub fn api_key(&self) -> Option<String> {
        non_empty(&self.api_key)
            .map(str::to_string)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()))
    }
}

/// Where expense records are kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordsBackend {
    Memory,
    #[default]
    Sqlite,
}

/// Record store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsSettings {
    pub backend: RecordsBackend,
    pub sqlite_path: Option<String>,
}

impl RecordsSettings {
    pub fn sqlite_path(&self) -> Option<&str> {
        non_empty(&self.sqlite_path)
    }
}
