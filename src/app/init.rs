//! Application wiring
//!
//! Builds the cache client, record store, text generator and dialogue engine
//! from an [`AppConfig`].

use super::config::{AppConfig, CacheSettings, LlmSettings, RecordsBackend, RecordsSettings};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tally_cache::{CacheClient, CacheConfig, RedisBackend};
use tally_core::{DialogueEngine, InMemoryRecordStore, RecordStore, SqliteRecordStore};
use tally_llm::{DisabledGenerator, OpenAiCompatibleConfig, OpenAiCompatibleGenerator, TextGenerator};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Everything a command needs, built once per process
pub struct App {
    pub engine: DialogueEngine,
    pub cache: Arc<CacheClient>,
    pub sqlite: Option<Arc<SqliteRecordStore>>,
    pub generator_name: String,
    sweeper: JoinHandle<()>,
}

impl Drop for App {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}

fn build_cache(settings: &CacheSettings) -> Result<Arc<CacheClient>> {
    let Some(url) = settings.redis_url() else {
        return Ok(Arc::new(CacheClient::memory_only()));
    };

    let probe_timeout = Duration::from_millis(settings.probe_timeout_ms);
    let command_timeout = Duration::from_millis(settings.command_timeout_ms);
    let backend = RedisBackend::with_options(url, &settings.key_prefix, probe_timeout, command_timeout)
        .context("Invalid Redis URL")?;

    let config = CacheConfig::new()
        .with_probe_timeout(probe_timeout)
        .with_command_timeout(command_timeout)
        .with_fallback_retry_after(settings.fallback_retry_after());

    info!(prefix = %settings.key_prefix, "Redis session cache configured");
    Ok(Arc::new(CacheClient::new(Arc::new(backend), config)))
}

async fn build_records(
    settings: &RecordsSettings,
) -> Result<(Arc<dyn RecordStore>, Option<Arc<SqliteRecordStore>>)> {
    match settings.backend {
        RecordsBackend::Memory => {
            warn!("Using in-memory record store; expenses are lost on exit");
            let records: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
            Ok((records, None))
        }
        RecordsBackend::Sqlite => {
            let path = match settings.sqlite_path() {
                Some(path) => PathBuf::from(path),
                None => SqliteRecordStore::default_path()
                    .context("Could not determine the default database path")?,
            };
            let store = Arc::new(
                SqliteRecordStore::new(&path)
                    .await
                    .with_context(|| format!("Failed to open {}", path.display()))?,
            );
            let records: Arc<dyn RecordStore> = store.clone();
            Ok((records, Some(store)))
        }
    }
}

fn build_generator(settings: &LlmSettings) -> Result<Arc<dyn TextGenerator>> {
    if !settings.enabled {
        info!("Text generation disabled; using static fallbacks");
        return Ok(Arc::new(DisabledGenerator));
    }

    let mut config = OpenAiCompatibleConfig::new()
        .with_base_url(&settings.base_url)
        .with_model(&settings.model)
        .with_timeout(Duration::from_secs(settings.timeout_secs));
    config.max_tokens = settings.max_tokens;
    config.temperature = settings.temperature;

    match settings.api_key() {
        Some(key) => config = config.with_api_key(key),
        None => warn!("llm.enabled is set but no API key was found"),
    }

    let generator = OpenAiCompatibleGenerator::new(config).context("Failed to build text generator")?;
    info!(model = %generator.model(), "Text generation enabled");
    Ok(Arc::new(generator))
}

/// Build the application from configuration
pub async fn build(config: &AppConfig) -> Result<App> {
    let cache = build_cache(&config.cache)?;
    let sweeper = cache
        .fallback_store()
        .spawn_sweeper(Duration::from_secs(config.cache.sweep_interval_secs.max(1)));

    let (records, sqlite) = build_records(&config.records).await?;
    let generator = build_generator(&config.llm)?;
    let generator_name = generator.name().to_string();

    let engine = DialogueEngine::new(Arc::clone(&cache), records, generator)
        .with_config(config.engine.clone())
        .with_session_ttl(Duration::from_secs(config.sessions.ttl_secs))
        .with_history_limits(
            Duration::from_secs(config.sessions.history_ttl_secs),
            config.sessions.history_limit,
        );

    Ok(App {
        engine,
        cache,
        sqlite,
        generator_name,
        sweeper,
    })
}
