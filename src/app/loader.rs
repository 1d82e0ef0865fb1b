//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            File::with_name(&format!(
                "config/{}",
                std::env::var("TALLY_ENV").unwrap_or_else(|_| "development".to_string())
            ))
            .required(false),
        )
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables (highest priority): TALLY_CACHE__REDIS_URL
        .add_source(
            Environment::with_prefix("TALLY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::RecordsBackend;

    fn embedded() -> AppConfig {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_embedded_defaults_deserialize() {
        let config = embedded();
        assert_eq!(config.cache.redis_url(), None);
        assert_eq!(config.cache.key_prefix, "tally:");
        assert_eq!(config.sessions.ttl_secs, 1800);
        assert_eq!(config.records.backend, RecordsBackend::Sqlite);
        assert_eq!(config.records.sqlite_path(), None);
        assert_eq!(config.engine.recent_limit, 5);
        assert!(!config.llm.enabled);
    }

    #[test]
    fn test_missing_sections_use_struct_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str("[records]\nbackend = \"memory\"", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.records.backend, RecordsBackend::Memory);
        assert_eq!(config.cache.fallback_retry_secs, 60);
        assert_eq!(config.engine.amount_warning_threshold, 10_000.0);
    }

    #[test]
    fn test_zero_retry_disables_periodic_reprobe() {
        let mut config = embedded();
        config.cache.fallback_retry_secs = 0;
        assert_eq!(config.cache.fallback_retry_after(), None);
    }
}
