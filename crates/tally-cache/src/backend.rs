//! Backend abstraction shared by the networked cache and the in-process store

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A TTL-keyed string store.
///
/// Payloads are opaque text (JSON in practice). Writing `None` removes the key,
/// so a deleted entry is indistinguishable from one that never existed.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Backend name used in logs and status output
    fn name(&self) -> &str;

    /// Lightweight liveness check
    async fn ping(&self) -> Result<()>;

    /// Read a key; expired or deleted keys read as `None`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a key with a time-to-live, or remove it when `value` is `None`
    async fn set(&self, key: &str, value: Option<&str>, ttl: Duration) -> Result<()>;

    /// Remove a key
    async fn delete(&self, key: &str) -> Result<()> {
        self.set(key, None, Duration::from_secs(1)).await
    }
}

/// Round a TTL up to whole seconds, never below one.
#[must_use]
pub fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_seconds_rounds_up() {
        assert_eq!(ttl_seconds(Duration::from_millis(1)), 1);
        assert_eq!(ttl_seconds(Duration::from_millis(1500)), 2);
        assert_eq!(ttl_seconds(Duration::from_secs(1800)), 1800);
        assert_eq!(ttl_seconds(Duration::ZERO), 1);
    }
}
