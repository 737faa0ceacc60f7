use std::time::Duration;

use async_trait::async_trait;

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("cache {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Byte-oriented key/value store with per-entry expiry.
///
/// Values are opaque; callers own their encoding. A `set` replaces the whole
/// value of a key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` is a miss.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
