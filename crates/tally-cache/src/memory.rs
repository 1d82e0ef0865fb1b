//! In-process cache used as the fallback when the networked backend is down
//!
//! # Expiry
//!
//! - Lazy: every read checks `expires_at` and drops stale entries
//! - Swept: [`MemoryCache::spawn_sweeper`] purges expired entries periodically
//!   so abandoned keys do not keep memory alive
//!
//! Clock reads go through `tokio::time::Instant` so expiry follows paused time in tests.

use crate::backend::CacheBackend;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// A stored payload and the instant it stops being readable
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Stored payload
    pub payload: String,
    /// Expiry instant
    pub expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory TTL cache. Cannot fail.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a live entry
    pub async fn read(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.payload.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Entry exists but is stale: drop it under the write lock
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
            debug!(key = %key, "Expired cache entry dropped on read");
        }
        None
    }

    /// Write or remove an entry
    pub async fn write(&self, key: &str, value: Option<&str>, ttl: Duration) {
        let mut entries = self.entries.write().await;
        match value {
            Some(payload) => {
                entries.insert(
                    key.to_string(),
                    CacheEntry {
                        payload: payload.to_string(),
                        expires_at: Instant::now() + ttl,
                    },
                );
            }
            None => {
                entries.remove(key);
            }
        }
    }

    /// Number of entries currently held, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Live payload and its remaining TTL
    pub async fn read_with_ttl(&self, key: &str) -> Option<(String, Duration)> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| (entry.payload.clone(), entry.expires_at - now))
    }

    /// Remove expired entries, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let initial_count = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = initial_count - entries.len();

        if removed > 0 {
            debug!(
                removed = removed,
                remaining = entries.len(),
                "Purged expired cache entries"
            );
        }
        removed
    }

    /// Spawn a background task that purges expired entries every `interval`
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.purge_expired().await;
            }
        })
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    fn name(&self) -> &str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read(key).await)
    }

    async fn set(&self, key: &str, value: Option<&str>, ttl: Duration) -> Result<()> {
        self.write(key, value, ttl).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
