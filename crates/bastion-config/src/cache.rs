//! Cache backend configuration.
//!
//! # Environment Variables
//!
//! - `REDIS_URL`: Redis connection URL (default: `redis://127.0.0.1:6379`)
//! - `APP_CACHE_BACKEND`: `redis` or `memory` (default: `redis`)
//! - `APP_CACHE_ROLE_TTL_SECS`: lifetime of a cached role set (default: `300`)
//! - `APP_CACHE_OP_TIMEOUT_MS`: upper bound for a single cache call (default: `500`)

use std::{str::FromStr, time::Duration};

use crate::env::{parsed_or, string_or};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown cache backend: {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub redis_url: String,
    pub backend: CacheBackend,
    pub role_ttl_secs: u64,
    pub op_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".into(),
            backend: CacheBackend::Redis,
            role_ttl_secs: 300,
            op_timeout_ms: 500,
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_url: string_or("REDIS_URL", defaults.redis_url),
            backend: parsed_or("APP_CACHE_BACKEND", defaults.backend),
            role_ttl_secs: parsed_or("APP_CACHE_ROLE_TTL_SECS", defaults.role_ttl_secs),
            op_timeout_ms: parsed_or("APP_CACHE_OP_TIMEOUT_MS", defaults.op_timeout_ms),
        }
    }

    pub fn role_ttl(&self) -> Duration {
        Duration::from_secs(self.role_ttl_secs)
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}
