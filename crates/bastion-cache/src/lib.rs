//! # Bastion Cache
//!
//! A small byte-oriented cache abstraction ([`CacheStore`]) with two
//! backends:
//!
//! - [`RedisCache`]: shared Redis through a connection manager, every call
//!   bounded by a timeout
//! - [`MemoryCache`]: process-local map, for single-node runs and tests
//!
//! # Example
//!
//! ```ignore
//! use bastion_cache::{connect, keys};
//! use bastion_config::CacheConfig;
//!
//! let cache = connect(&CacheConfig::from_env()).await?;
//! cache.set(&keys::users::roles(42), b"[]", Duration::from_secs(300)).await?;
//! ```

pub mod keys;
pub mod memory;
pub mod redis;
pub mod store;

use std::sync::Arc;

use bastion_config::{CacheBackend, CacheConfig};

pub use memory::MemoryCache;
pub use self::redis::RedisCache;
pub use store::{CacheError, CacheStore};

/// Builds the backend selected by `config.backend`.
pub async fn connect(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    match config.backend {
        CacheBackend::Redis => {
            let cache = RedisCache::connect(&config.redis_url, config.op_timeout()).await?;
            tracing::info!("Redis cache connected");
            Ok(Arc::new(cache))
        }
        CacheBackend::Memory => {
            tracing::info!("Using in-process memory cache");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}
