//! Session token issuing, verification and extraction.
//!
//! Tokens are HS256 JWTs carrying [`Claims`]. A token is valid until `exp`;
//! once the clock passes `refresh_at` the authentication layer mints a
//! replacement and hands it back in the `New-Token` response header.
//!
//! # Example
//!
//! ```ignore
//! use bastion_auth::TokenService;
//! use bastion_config::JwtConfig;
//!
//! let tokens = TokenService::new(&JwtConfig::from_env());
//! let issued = tokens.issue(42)?;
//! let claims = tokens.verify(&issued.token)?;
//! assert_eq!(claims.user_unique_id, 42);
//! ```

use std::collections::HashMap;

use axum::{
    extract::Query,
    http::{HeaderMap, HeaderName, Uri},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use tracing::debug;
use uuid::Uuid;

use bastion_config::JwtConfig;
use bastion_core::errors::{
    AppException, TOKEN_EXPIRED, TOKEN_GENERATION_FAILED, TOKEN_NOT_FOUND,
};

use crate::claims::Claims;

/// Response header carrying a silently refreshed token (`New-Token`).
pub const NEW_TOKEN_HEADER: HeaderName = HeaderName::from_static("new-token");

/// Token locations, checked in this order.
const QUERY_KEYS: [&str; 2] = ["Authorization", "token"];
const HEADER_KEYS: [&str; 2] = ["Authorization", "token"];

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token not found in query or headers")]
    NotFound,
    #[error("token is invalid: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("token has expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Generation(jsonwebtoken::errors::Error),
}

impl From<TokenError> for AppException {
    fn from(err: TokenError) -> Self {
        match &err {
            TokenError::NotFound => AppException::new(TOKEN_NOT_FOUND),
            // an unverifiable token is reported the same way as an expired one
            TokenError::Invalid(_) | TokenError::Expired => {
                AppException::new(TOKEN_EXPIRED).with_detail(err.to_string())
            }
            TokenError::Generation(_) => {
                AppException::new(TOKEN_GENERATION_FAILED).with_detail(err.to_string())
            }
        }
    }
}

/// A freshly signed token and the instants that bound its life.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expire_at: DateTime<Utc>,
    pub refresh_at: DateTime<Utc>,
}

/// Stateless signer/verifier built once from [`JwtConfig`].
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expire: Duration,
    issuer: String,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("expire", &self.expire)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            expire: Duration::seconds(config.expire_secs),
            issuer: config.issuer.clone(),
        }
    }

    pub fn expire(&self) -> Duration {
        self.expire
    }

    pub fn issue(&self, user_unique_id: i64) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_unique_id, Utc::now())
    }

    /// Signs a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        user_unique_id: i64,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expire_at = now + self.expire;
        let refresh_at = now + self.expire * 2 / 3;

        let claims = Claims {
            user_unique_id,
            refresh_at: refresh_at.timestamp(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expire_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Generation)?;

        Ok(IssuedToken {
            token,
            expire_at,
            refresh_at,
        })
    }

    /// Checks signature, issuer and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    debug!(error = %e, "Token failed verification");
                    TokenError::Invalid(e)
                }
            })
    }
}

/// Finds the bearer token of a request.
///
/// Looks at the `Authorization` query parameter, the `token` query
/// parameter, the `Authorization` header and the `token` header, in that
/// order. A leading `Bearer ` is stripped and the first non-empty value wins.
pub fn extract_token(uri: &Uri, headers: &HeaderMap) -> Result<String, TokenError> {
    let query = Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(params)| params)
        .unwrap_or_default();

    let from_query = QUERY_KEYS
        .iter()
        .filter_map(|key| query.get(*key).map(String::as_str));
    let from_headers = HEADER_KEYS
        .iter()
        .filter_map(|key| headers.get(*key).and_then(|v| v.to_str().ok()));

    from_query
        .chain(from_headers)
        .map(strip_bearer)
        .find(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or(TokenError::NotFound)
}

fn strip_bearer(raw: &str) -> &str {
    raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn service() -> TokenService {
        TokenService::new(&JwtConfig {
            secret: "test-secret".into(),
            expire_secs: 3600,
            issuer: "bastion-test".into(),
        })
    }

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service();
        let before = Utc::now().timestamp();
        let issued = tokens.issue(7).unwrap();
        let claims = tokens.verify(&issued.token).unwrap();

        assert_eq!(claims.user_unique_id, 7);
        assert_eq!(claims.iss, "bastion-test");
        assert!(claims.refresh_at < claims.exp);
        assert!(claims.exp <= before + 3600 + 1);
        assert!(issued.refresh_at < issued.expire_at);
    }

    #[test]
    fn test_refresh_at_is_two_thirds_of_lifetime() {
        let tokens = service();
        let now = Utc::now();
        let issued = tokens.issue_at(1, now).unwrap();
        assert_eq!(issued.refresh_at - now, Duration::seconds(2400));
        assert_eq!(issued.expire_at - now, Duration::seconds(3600));
    }

    #[test]
    fn test_expired_token() {
        let tokens = service();
        let issued = tokens
            .issue_at(1, Utc::now() - Duration::seconds(3601))
            .unwrap();
        assert!(matches!(tokens.verify(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_garbage_and_foreign_tokens_are_invalid() {
        let tokens = service();
        assert!(matches!(tokens.verify("not.a.jwt"), Err(TokenError::Invalid(_))));

        let other = TokenService::new(&JwtConfig {
            secret: "other-secret".into(),
            expire_secs: 3600,
            issuer: "bastion-test".into(),
        });
        let foreign = other.issue(1).unwrap();
        assert!(matches!(tokens.verify(&foreign.token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_issuer_is_invalid() {
        let other = TokenService::new(&JwtConfig {
            secret: "test-secret".into(),
            expire_secs: 3600,
            issuer: "someone-else".into(),
        });
        let issued = other.issue(1).unwrap();
        assert!(matches!(service().verify(&issued.token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_tokens_minted_together_differ() {
        let tokens = service();
        let now = Utc::now();
        let a = tokens.issue_at(1, now).unwrap();
        let b = tokens.issue_at(1, now).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_extract_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer header-auth"));
        headers.insert("token", HeaderValue::from_static("header-token"));

        let token = extract_token(&uri("/x?token=query-token&Authorization=query-auth"), &headers);
        assert_eq!(token.unwrap(), "query-auth");

        let token = extract_token(&uri("/x?token=query-token"), &headers);
        assert_eq!(token.unwrap(), "query-token");

        let token = extract_token(&uri("/x"), &headers);
        assert_eq!(token.unwrap(), "header-auth");

        headers.remove("Authorization");
        let token = extract_token(&uri("/x"), &headers);
        assert_eq!(token.unwrap(), "header-token");
    }

    #[test]
    fn test_extract_skips_empty_values() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer "));
        headers.insert("token", HeaderValue::from_static("fallback"));

        let token = extract_token(&uri("/x?Authorization="), &headers);
        assert_eq!(token.unwrap(), "fallback");
    }

    #[test]
    fn test_extract_strips_bearer_in_query() {
        let token = extract_token(&uri("/x?Authorization=Bearer%20abc"), &HeaderMap::new());
        assert_eq!(token.unwrap(), "abc");
    }

    #[test]
    fn test_extract_not_found() {
        let err = extract_token(&uri("/x?page=1"), &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, TokenError::NotFound));
    }

    #[test]
    fn test_error_mapping() {
        assert!(AppException::from(TokenError::NotFound).is(TOKEN_NOT_FOUND));
        assert!(AppException::from(TokenError::Expired).is(TOKEN_EXPIRED));

        let invalid = service().verify("garbage").unwrap_err();
        assert!(AppException::from(invalid).is(TOKEN_EXPIRED));
    }
}
