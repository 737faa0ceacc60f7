//! Redis-backed [`CacheStore`].
//!
//! Every command is bounded by the configured operation timeout so a stalled
//! Redis degrades into a [`CacheError::Timeout`] instead of a hung request.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, instrument};

use crate::store::{CacheError, CacheStore};

/// Redis cache client with connection pooling.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("op_timeout", &self.op_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connects to `redis_url`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if the URL is malformed or the first
    /// connection cannot be established, `CacheError::Timeout` if that takes
    /// longer than `op_timeout`.
    pub async fn connect(redis_url: &str, op_timeout: Duration) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let conn = bounded("CONNECT", op_timeout, ConnectionManager::new(client)).await?;

        Ok(Self { conn, op_timeout })
    }
}

async fn bounded<T, F>(operation: &'static str, after: Duration, fut: F) -> Result<T, CacheError>
where
    F: Future<Output = Result<T, redis::RedisError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result.map_err(CacheError::from),
        Err(_) => Err(CacheError::Timeout { operation, after }),
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = bounded("GET", self.op_timeout, conn.get(key)).await?;

        debug!(cache.key = %key, hit = value.is_some(), "Cache lookup");
        Ok(value)
    }

    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry
        let secs = ttl.as_secs().max(1);

        bounded(
            "SETEX",
            self.op_timeout,
            conn.set_ex::<_, _, ()>(key, value, secs),
        )
        .await?;

        debug!(cache.key = %key, cache.ttl_secs = secs, "Cache set");
        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        bounded("DEL", self.op_timeout, conn.del::<_, ()>(key)).await?;

        debug!(cache.key = %key, "Cache invalidated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_reports_timeout() {
        let never = std::future::pending::<Result<(), redis::RedisError>>();
        let err = bounded("GET", Duration::from_millis(10), never)
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Timeout { operation: "GET", .. }));
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let err = RedisCache::connect("not a url", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Connection(_)));
    }

    // Requires a running Redis instance
    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_set_get_delete() {
        let cache = RedisCache::connect("redis://localhost:6379", Duration::from_secs(1))
            .await
            .unwrap();

        cache.set("test:key", b"value", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("test:key").await.unwrap(), Some(b"value".to_vec()));

        cache.delete("test:key").await.unwrap();
        assert_eq!(cache.get("test:key").await.unwrap(), None);
    }
}
