use std::time::Duration;

use crate::env::{parsed_or, string_or};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whole-request deadline in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            request_timeout_ms: 10_000,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: string_or("APP_SERVER_HOST", defaults.host),
            port: parsed_or("APP_SERVER_PORT", defaults.port),
            request_timeout_ms: parsed_or(
                "APP_SERVER_REQUEST_TIMEOUT_MS",
                defaults.request_timeout_ms,
            ),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
