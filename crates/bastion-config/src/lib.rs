//! # Bastion Config
//!
//! Configuration sections loaded from environment variables. Every section
//! has a statically written [`Default`] and a `from_env()` that overlays the
//! environment on top of it.
//!
//! - [`server`]: bind address and request deadline
//! - [`database`]: PostgreSQL pool settings
//! - [`cache`]: cache backend, role ttl and per-call timeout
//! - [`jwt`]: token signing settings
//! - [`log`]: log level and sinks
//! - [`cors`]: allowed origins
//!
//! # Example
//!
//! ```ignore
//! use bastion_config::{AppConfig, ServerMode};
//!
//! bastion_config::load_env_files(ServerMode::Dev);
//! let config = AppConfig::from_env(ServerMode::Dev);
//! config.validate()?;
//! ```

pub mod cache;
pub mod cors;
pub mod database;
mod env;
pub mod jwt;
pub mod log;
pub mod mode;
pub mod server;

pub use cache::{CacheBackend, CacheConfig};
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use log::LogConfig;
pub use mode::ServerMode;
pub use server::ServerConfig;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must not be empty")]
    EmptyJwtSecret,
    #[error("JWT_SECRET is still the shipped placeholder; set a real secret in prod")]
    PlaceholderJwtSecret,
    #[error("JWT_EXPIRE_SECS must be positive, got {0}")]
    NonPositiveExpiry(i64),
    #[error("JWT_ISSUER must not be empty")]
    EmptyIssuer,
    #[error("unknown LOG_LEVEL {0:?}")]
    UnknownLogLevel(String),
}

/// Loads `.env.<mode>` and then `.env`. Variables already set win, so the
/// mode file takes precedence over the shared one.
pub fn load_env_files(mode: ServerMode) {
    if let Err(e) = dotenvy::from_filename(mode.env_file()) {
        if !e.not_found() {
            eprintln!("failed to load {}: {e}", mode.env_file());
        }
    }
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("failed to load .env: {e}");
        }
    }
}

/// Picks the mode before any env file is loaded: the `--mode` flag or a
/// real `APP_MODE` variable first, then `APP_MODE` from `.env`, then dev.
pub fn resolve_mode(flag: Option<ServerMode>) -> ServerMode {
    flag.or_else(|| {
        dotenvy::dotenv_iter()
            .ok()
            .and_then(|iter| mode_from_pairs(iter.filter_map(Result::ok)))
    })
    .unwrap_or_default()
}

fn mode_from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Option<ServerMode> {
    // first assignment wins, as when dotenvy loads the file
    let (_, raw) = pairs.into_iter().find(|(key, _)| key == "APP_MODE")?;
    match raw.parse() {
        Ok(mode) => Some(mode),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring APP_MODE from .env");
            None
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub mode: ServerMode,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub jwt: JwtConfig,
    pub log: LogConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    pub fn from_env(mode: ServerMode) -> Self {
        Self {
            mode,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            jwt: JwtConfig::from_env(),
            log: LogConfig::from_env(),
            cors: CorsConfig::from_env(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::EmptyJwtSecret);
        }
        if self.mode == ServerMode::Prod && self.jwt.uses_placeholder_secret() {
            return Err(ConfigError::PlaceholderJwtSecret);
        }
        if self.jwt.expire_secs <= 0 {
            return Err(ConfigError::NonPositiveExpiry(self.jwt.expire_secs));
        }
        if self.jwt.issuer.trim().is_empty() {
            return Err(ConfigError::EmptyIssuer);
        }
        if !self.log.is_known_level() {
            return Err(ConfigError::UnknownLogLevel(self.log.level.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(AppConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let mut config = AppConfig::default();
        config.jwt.secret.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyJwtSecret));
    }

    #[test]
    fn test_prod_rejects_placeholder_secret() {
        let mut config = AppConfig {
            mode: ServerMode::Prod,
            ..AppConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::PlaceholderJwtSecret));

        config.jwt.secret = "a-real-deployment-secret".into();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_placeholder_secret_allowed_outside_prod() {
        for mode in [ServerMode::Dev, ServerMode::Test] {
            let config = AppConfig {
                mode,
                ..AppConfig::default()
            };
            assert_eq!(config.validate(), Ok(()));
        }
    }

    #[test]
    fn test_validate_rejects_zero_expiry() {
        let mut config = AppConfig::default();
        config.jwt.expire_secs = 0;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveExpiry(0)));
    }

    #[test]
    fn test_validate_rejects_blank_issuer() {
        let mut config = AppConfig::default();
        config.jwt.issuer = "  ".into();
        assert_eq!(config.validate(), Err(ConfigError::EmptyIssuer));
    }

    #[test]
    fn test_validate_rejects_unknown_level() {
        let mut config = AppConfig::default();
        config.log.level = "verbose".into();
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownLogLevel("verbose".into()))
        );
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_mode_from_dotenv_pairs() {
        let found = mode_from_pairs(pairs(&[("JWT_SECRET", "x"), ("APP_MODE", "prod")]));
        assert_eq!(found, Some(ServerMode::Prod));

        assert_eq!(mode_from_pairs(pairs(&[("JWT_SECRET", "x")])), None);
        assert_eq!(mode_from_pairs(pairs(&[("APP_MODE", "staging")])), None);
    }

    #[test]
    fn test_flag_wins_over_dotenv() {
        assert_eq!(resolve_mode(Some(ServerMode::Test)), ServerMode::Test);
    }

    #[test]
    fn test_static_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 100);
        assert_eq!(config.jwt.expire_secs, 3600);
        assert_eq!(config.cache.role_ttl_secs, 300);
    }
}
