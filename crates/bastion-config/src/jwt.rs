use crate::env::{parsed_or, string_or};

/// Shipped default secret; only acceptable outside production.
pub const PLACEHOLDER_SECRET: &str = "your-secret-key-change-in-production";

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds.
    pub expire_secs: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: PLACEHOLDER_SECRET.into(),
            expire_secs: 3600,
            issuer: "bastion".into(),
        }
    }
}

impl JwtConfig {
    pub fn uses_placeholder_secret(&self) -> bool {
        self.secret == PLACEHOLDER_SECRET
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: string_or("JWT_SECRET", defaults.secret),
            expire_secs: parsed_or("JWT_EXPIRE_SECS", defaults.expire_secs),
            issuer: string_or("JWT_ISSUER", defaults.issuer),
        }
    }
}
