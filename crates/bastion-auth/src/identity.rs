//! Request-scoped identity slot.
//!
//! The authentication layer binds the verified subject id into the request
//! extensions; role guards and handlers read it back. A later bind on the
//! same request overwrites the earlier one.

use axum::{extract::FromRequestParts, http::Extensions, http::request::Parts};

use bastion_core::errors::AppException;

/// Verified subject id of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub i64);

pub fn bind_identity(extensions: &mut Extensions, user_unique_id: i64) {
    extensions.insert(Identity(user_unique_id));
}

pub fn identity_of(extensions: &Extensions) -> Option<i64> {
    extensions.get::<Identity>().map(|Identity(id)| *id)
}

/// Rejection for a request that reached an identity-dependent stage unauthenticated.
pub fn missing_identity() -> AppException {
    AppException::unauthorized("user unique id not found")
}

pub fn get_identity(extensions: &Extensions) -> Result<i64, AppException> {
    identity_of(extensions).ok_or_else(missing_identity)
}

/// Extractor for handlers behind the authentication layer.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppException;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        get_identity(&parts.extensions).map(CurrentUser)
    }
}
