//! Redis-backed cache (networked primary)
//!
//! # Behaviour
//!
//! - One multiplexed connection is opened lazily and reused
//! - Every connect and command is bounded by a timeout; a timed-out or failed
//!   command drops the cached connection so the next call reconnects
//! - Keys are prefixed to isolate them from other Redis data

use crate::backend::{ttl_seconds, CacheBackend};
use crate::error::{CacheError, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Default key prefix
pub const DEFAULT_PREFIX: &str = "tally:";

/// Redis cache backend
pub struct RedisBackend {
    client: redis::Client,
    /// Key prefix for every key written by this backend
    prefix: String,
    connect_timeout: Duration,
    command_timeout: Duration,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl RedisBackend {
    /// Create a new Redis backend
    ///
    /// # Errors
    ///
    /// Returns error if the Redis URL is invalid. No connection is attempted.
    pub fn new(redis_url: &str) -> Result<Self> {
        Self::with_options(
            redis_url,
            DEFAULT_PREFIX,
            Duration::from_secs(2),
            Duration::from_secs(2),
        )
    }

    /// Create with custom prefix and timeouts
    ///
    /// # Errors
    ///
    /// Returns error if the Redis URL is invalid
    pub fn with_options(
        redis_url: &str,
        prefix: &str,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self> {
        let client =
            redis::Client::open(redis_url).map_err(|e| CacheError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            prefix: prefix.to_string(),
            connect_timeout,
            command_timeout,
            connection: Mutex::new(None),
        })
    }

    /// Build the full Redis key
    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Get (or open) the shared connection
    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        let mut guard = self.connection.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let conn = tokio::time::timeout(
            self.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| CacheError::Timeout(self.connect_timeout.as_millis() as u64))?
        .map_err(|e| CacheError::Unavailable(format!("Redis connection failed: {}", e)))?;

        debug!("Redis connection established");
        *guard = Some(conn.clone());
        Ok(conn)
    }

    /// Run a command under the command timeout, dropping the connection on failure
    async fn run<T, F>(&self, command: &str, fut: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        let outcome = match tokio::time::timeout(self.command_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CacheError::Backend(format!("Redis {} failed: {}", command, e))),
            Err(_) => Err(CacheError::Timeout(self.command_timeout.as_millis() as u64)),
        };

        if outcome.is_err() {
            *self.connection.lock().await = None;
        }
        outcome
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &str {
        "redis"
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let _: String = self
            .run("PING", redis::cmd("PING").query_async::<String>(&mut conn))
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;
        let key = self.build_key(key);

        let data: Option<String> = self
            .run(
                "GET",
                redis::cmd("GET").arg(&key).query_async::<Option<String>>(&mut conn),
            )
            .await?;

        debug!(key = %key, hit = data.is_some(), "Redis GET");
        Ok(data)
    }

    async fn set(&self, key: &str, value: Option<&str>, ttl: Duration) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let key = self.build_key(key);

        match value {
            Some(payload) => {
                let secs = ttl_seconds(ttl);
                self.run(
                    "SETEX",
                    redis::cmd("SETEX")
                        .arg(&key)
                        .arg(secs)
                        .arg(payload)
                        .query_async::<()>(&mut conn),
                )
                .await?;
                debug!(key = %key, ttl = secs, "Redis SETEX");
            }
            None => {
                let deleted: i64 = self
                    .run("DEL", redis::cmd("DEL").arg(&key).query_async::<i64>(&mut conn))
                    .await?;
                debug!(key = %key, deleted = deleted > 0, "Redis DEL");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_rejected() {
        assert!(RedisBackend::new("not a url").is_err());
    }

    #[test]
    fn test_key_prefix() {
        let backend = RedisBackend::with_options(
            "redis://127.0.0.1:6379",
            "test:",
            Duration::from_millis(100),
            Duration::from_millis(100),
        )
        .unwrap();
        assert_eq!(backend.build_key("a:b"), "test:a:b");
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_fast() {
        // Port 1 is reserved; nothing listens there
        let backend = RedisBackend::with_options(
            "redis://127.0.0.1:1",
            "test:",
            Duration::from_millis(300),
            Duration::from_millis(300),
        )
        .unwrap();
        assert!(backend.ping().await.is_err());
    }

    // Redis tests require a running Redis instance
    // Run with: cargo test --features redis-tests
    #[cfg(feature = "redis-tests")]
    #[tokio::test]
    async fn test_redis_backend() {
        let backend = RedisBackend::new("redis://127.0.0.1:6379").unwrap();
        backend.ping().await.unwrap();

        backend
            .set("test:redis:key", Some("hello"), Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(
            backend.get("test:redis:key").await.unwrap().as_deref(),
            Some("hello")
        );

        backend.delete("test:redis:key").await.unwrap();
        assert_eq!(backend.get("test:redis:key").await.unwrap(), None);
    }
}
