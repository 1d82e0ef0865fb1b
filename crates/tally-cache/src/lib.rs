//! Tally Cache - Resilient key-value store
//!
//! This crate provides the TTL cache that dialogue sessions live in:
//! - Backend: `CacheBackend` trait shared by every store
//! - Redis: networked primary with connect/command timeouts
//! - Memory: in-process fallback with lazy and swept expiry
//! - Client: `CacheClient` with probe-before-use failover and a fallback flag

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod client;
pub mod error;
pub mod memory;
pub mod redis_backend;

pub use backend::{ttl_seconds, CacheBackend};
pub use client::{CacheClient, CacheConfig, CacheStatus};
pub use error::{CacheError, Result};
pub use memory::{CacheEntry, MemoryCache};
pub use redis_backend::RedisBackend;
