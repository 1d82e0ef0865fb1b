//! Resilient cache client
//!
//! Routes every operation to the networked backend when it is healthy and to the
//! in-process [`MemoryCache`] otherwise.
//!
//! # Failover
//!
//! Each call first probes the primary with a `ping`. A failed probe, a timeout or a
//! failed command engages the fallback: the operation is replayed against the memory
//! cache and the `fallback_engaged` flag is raised so later calls skip the primary
//! entirely instead of paying the timeout again. The flag is cleared by
//! [`CacheClient::reset_fallback`] or automatically once `fallback_retry_after` has
//! elapsed, at which point the next call re-probes the primary.
//!
//! # Resynchronisation
//!
//! Keys written or deleted while the fallback is engaged are remembered. Before the
//! primary serves traffic again, each of them is replayed to it: live values with
//! their remaining TTL, removed or expired keys as deletes. A key deleted during an
//! outage therefore stays deleted after recovery.

use crate::backend::CacheBackend;
use crate::error::{CacheError, Result};
use crate::memory::MemoryCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Tunables for [`CacheClient`]
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Upper bound for the liveness probe
    pub probe_timeout: Duration,
    /// Upper bound for a single command
    pub command_timeout: Duration,
    /// Re-probe the primary this long after the fallback was engaged (`None` = manual reset only)
    pub fallback_retry_after: Option<Duration>,
    /// TTL used for deletes expressed as null writes
    pub min_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_millis(500),
            command_timeout: Duration::from_secs(2),
            fallback_retry_after: Some(Duration::from_secs(60)),
            min_ttl: Duration::from_secs(1),
        }
    }
}

impl CacheConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the probe timeout
    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the command timeout
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the automatic re-probe delay
    #[must_use]
    pub fn with_fallback_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.fallback_retry_after = retry_after;
        self
    }
}

/// Point-in-time view of the client, for health output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    /// Name of the networked backend, if one is configured
    pub primary: Option<String>,
    /// Whether calls are currently bypassing the primary
    pub fallback_engaged: bool,
    /// Entries held by the in-process store
    pub fallback_entries: usize,
}

/// Cache client with transparent failover.
///
/// Constructed once per process and shared by reference (`Arc<CacheClient>`).
pub struct CacheClient {
    primary: Option<Arc<dyn CacheBackend>>,
    fallback: MemoryCache,
    config: CacheConfig,
    fallback_engaged: AtomicBool,
    engaged_at: Mutex<Option<Instant>>,
    /// Keys changed in the fallback that the primary has not seen yet
    unsynced: tokio::sync::Mutex<HashSet<String>>,
}

impl CacheClient {
    /// Create a client over a networked primary
    #[must_use]
    pub fn new(primary: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        Self {
            primary: Some(primary),
            fallback: MemoryCache::new(),
            config,
            fallback_engaged: AtomicBool::new(false),
            engaged_at: Mutex::new(None),
            unsynced: tokio::sync::Mutex::new(HashSet::new()),
        }
    }

    /// Create a client that only uses the in-process store
    #[must_use]
    pub fn memory_only() -> Self {
        info!("No networked cache configured, using in-process cache");
        Self {
            primary: None,
            fallback: MemoryCache::new(),
            config: CacheConfig::default(),
            fallback_engaged: AtomicBool::new(false),
            engaged_at: Mutex::new(None),
            unsynced: tokio::sync::Mutex::new(HashSet::new()),
        }
    }

    /// The in-process store (exposed so callers can start its sweeper)
    #[must_use]
    pub fn fallback_store(&self) -> &MemoryCache {
        &self.fallback
    }

    /// Whether calls are currently bypassing the primary
    #[must_use]
    pub fn is_fallback_engaged(&self) -> bool {
        self.fallback_engaged.load(Ordering::SeqCst)
    }

    /// Clear the fallback flag so the next call probes the primary again
    pub fn reset_fallback(&self) {
        if self.fallback_engaged.swap(false, Ordering::SeqCst) {
            info!("Cache fallback reset, primary will be probed on next call");
        }
        if let Ok(mut engaged_at) = self.engaged_at.lock() {
            *engaged_at = None;
        }
    }

    /// Snapshot of the client state
    pub async fn status(&self) -> CacheStatus {
        CacheStatus {
            primary: self.primary.as_ref().map(|p| p.name().to_string()),
            fallback_engaged: self.is_fallback_engaged(),
            fallback_entries: self.fallback.len().await,
        }
    }

    /// Store a raw payload (`None` deletes)
    pub async fn set(&self, key: &str, value: Option<&str>, ttl: Duration) -> Result<()> {
        let routed = self
            .with_primary("set", |primary| async move {
                primary.set(key, value, ttl).await
            })
            .await;

        match routed {
            Some(()) => Ok(()),
            None => {
                self.write_fallback(key, value, ttl).await;
                Ok(())
            }
        }
    }

    /// Read a raw payload
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let routed = self
            .with_primary("get", |primary| async move { primary.get(key).await })
            .await;

        match routed {
            Some(value) => Ok(value),
            None => Ok(self.fallback.read(key).await),
        }
    }

    /// Delete a key (a null write with the minimal TTL)
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.set(key, None, self.config.min_ttl).await
    }

    /// Serialize and store a value
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let payload =
            serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.set(key, Some(&payload), ttl).await
    }

    /// Read and deserialize a value
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(payload) => serde_json::from_str(&payload)
                .map(Some)
                .map_err(|e| CacheError::Serialization(format!("{}: {}", key, e))),
            None => Ok(None),
        }
    }

    /// Run `op` against the primary if it is usable.
    ///
    /// Returns `None` when the caller should use the fallback store instead.
    async fn with_primary<T, F, Fut>(&self, op: &'static str, f: F) -> Option<T>
    where
        F: FnOnce(Arc<dyn CacheBackend>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let primary = self.primary.as_ref()?;

        if self.is_fallback_engaged() && !self.retry_window_elapsed() {
            debug!(op = op, "Fallback engaged, skipping primary");
            return None;
        }

        match tokio::time::timeout(self.config.probe_timeout, primary.ping()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.engage_fallback(op, &e);
                return None;
            }
            Err(_) => {
                let e = CacheError::Timeout(self.config.probe_timeout.as_millis() as u64);
                self.engage_fallback(op, &e);
                return None;
            }
        }

        if let Err(e) = self.sync_primary(&**primary).await {
            self.engage_fallback(op, &e);
            return None;
        }

        let outcome = tokio::time::timeout(self.config.command_timeout, f(Arc::clone(primary)))
            .await
            .unwrap_or_else(|_| {
                Err(CacheError::Timeout(
                    self.config.command_timeout.as_millis() as u64
                ))
            });

        match outcome {
            Ok(value) => {
                if self.fallback_engaged.swap(false, Ordering::SeqCst) {
                    info!(backend = %primary.name(), "Primary cache recovered");
                }
                Some(value)
            }
            Err(e) => {
                self.engage_fallback(op, &e);
                None
            }
        }
    }

    async fn write_fallback(&self, key: &str, value: Option<&str>, ttl: Duration) {
        if self.primary.is_none() {
            self.fallback.write(key, value, ttl).await;
            return;
        }

        // Held across the write so a concurrent replay sees both or neither
        let mut unsynced = self.unsynced.lock().await;
        self.fallback.write(key, value, ttl).await;
        unsynced.insert(key.to_string());
    }

    /// Replay fallback changes to the primary. Replayed keys leave the fallback.
    async fn sync_primary(&self, primary: &dyn CacheBackend) -> Result<()> {
        let mut unsynced = self.unsynced.lock().await;
        if unsynced.is_empty() {
            return Ok(());
        }

        let keys: Vec<String> = unsynced.iter().cloned().collect();
        for key in keys {
            let entry = self.fallback.read_with_ttl(&key).await;
            let replay = async {
                match &entry {
                    Some((payload, ttl)) => primary.set(&key, Some(payload.as_str()), *ttl).await,
                    None => primary.delete(&key).await,
                }
            };
            tokio::time::timeout(self.config.command_timeout, replay)
                .await
                .unwrap_or_else(|_| {
                    Err(CacheError::Timeout(
                        self.config.command_timeout.as_millis() as u64
                    ))
                })?;

            self.fallback.write(&key, None, self.config.min_ttl).await;
            unsynced.remove(&key);
            debug!(key = %key, deleted = entry.is_none(), "Replayed fallback key to primary");
        }

        info!(backend = %primary.name(), "Fallback changes replayed to primary");
        Ok(())
    }

    fn retry_window_elapsed(&self) -> bool {
        let Some(retry_after) = self.config.fallback_retry_after else {
            return false;
        };
        let engaged_at = self.engaged_at.lock().ok().and_then(|guard| *guard);
        match engaged_at {
            Some(at) if at.elapsed() >= retry_after => {
                info!("Re-probing primary cache after fallback window");
                true
            }
            Some(_) => false,
            None => true,
        }
    }

    fn engage_fallback(&self, op: &str, error: &CacheError) {
        if let Ok(mut engaged_at) = self.engaged_at.lock() {
            *engaged_at = Some(Instant::now());
        }
        if !self.fallback_engaged.swap(true, Ordering::SeqCst) {
            warn!(op = op, error = %error, "Primary cache failed, using in-process fallback");
        } else {
            debug!(op = op, error = %error, "Primary cache still failing");
        }
    }
}
