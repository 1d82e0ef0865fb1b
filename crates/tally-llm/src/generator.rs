//! Text generator abstraction

use crate::error::{Error, Result};
use async_trait::async_trait;

/// Opaque prompt-in, text-out collaborator.
///
/// Callers must treat every failure as recoverable and have a static fallback.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generator name used in logs
    fn name(&self) -> &str;

    /// Generate a completion for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Generator used when no model is configured; every call fails with
/// [`Error::NotConfigured`] so callers take their fallback path.
#[derive(Debug, Default, Clone)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::NotConfigured(
            "no text generator configured".to_string(),
        ))
    }
}
