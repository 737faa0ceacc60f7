//! Application exception taxonomy.
//!
//! Every failure that reaches a client is an [`AppException`]: a stable numeric
//! code, a human-readable message, the HTTP status the code maps to, and an
//! optional list of detail strings.
//!
//! Codes are declared once as [`ErrorCode`] constants and collected in
//! [`REGISTRY`]. The binary calls [`ensure_unique_codes`] at startup so a
//! duplicated code is caught before the server accepts traffic.
//!
//! # Example
//!
//! ```ignore
//! use bastion_core::errors::{AppException, USER_NOT_FOUND};
//!
//! let err = AppException::new(USER_NOT_FOUND).with_detail("no user with unique id 42");
//! assert!(err.is(USER_NOT_FOUND));
//! ```

use std::collections::HashMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;
use validator::ValidationErrors;

use crate::locale::Locale;

/// A registered exception kind: status, numeric code and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode {
    pub status: StatusCode,
    pub code: i32,
    pub message: &'static str,
}

impl ErrorCode {
    pub const fn new(status: StatusCode, code: i32, message: &'static str) -> Self {
        Self {
            status,
            code,
            message,
        }
    }
}

// System exceptions
pub const INTERNAL_SERVER_ERROR: ErrorCode =
    ErrorCode::new(StatusCode::INTERNAL_SERVER_ERROR, 1000, "Internal server error");
pub const NOT_FOUND: ErrorCode = ErrorCode::new(StatusCode::NOT_FOUND, 1001, "Not found");
pub const BAD_REQUEST: ErrorCode = ErrorCode::new(StatusCode::BAD_REQUEST, 1002, "Bad request");
pub const INVALID_PARAM: ErrorCode =
    ErrorCode::new(StatusCode::BAD_REQUEST, 1003, "Invalid param");
pub const UNAUTHORIZED: ErrorCode =
    ErrorCode::new(StatusCode::UNAUTHORIZED, 1004, "Unauthorized");
pub const TOKEN_NOT_FOUND: ErrorCode =
    ErrorCode::new(StatusCode::UNAUTHORIZED, 1005, "Token not found");
pub const TOKEN_EXPIRED: ErrorCode =
    ErrorCode::new(StatusCode::UNAUTHORIZED, 1006, "Token expired");
pub const TOKEN_GENERATION_FAILED: ErrorCode =
    ErrorCode::new(StatusCode::UNAUTHORIZED, 1007, "Token generate failed");
pub const FORBIDDEN: ErrorCode = ErrorCode::new(StatusCode::FORBIDDEN, 1008, "Forbidden");
pub const TOO_MANY_REQUESTS: ErrorCode =
    ErrorCode::new(StatusCode::TOO_MANY_REQUESTS, 1009, "Too many requests");
pub const BAD_GATEWAY: ErrorCode = ErrorCode::new(StatusCode::BAD_GATEWAY, 1010, "Bad gateway");
pub const SERVICE_UNAVAILABLE: ErrorCode =
    ErrorCode::new(StatusCode::SERVICE_UNAVAILABLE, 1011, "Service unavailable");
pub const GATEWAY_TIMEOUT: ErrorCode =
    ErrorCode::new(StatusCode::GATEWAY_TIMEOUT, 1012, "Gateway timeout");
pub const NOT_IMPLEMENTED: ErrorCode =
    ErrorCode::new(StatusCode::NOT_IMPLEMENTED, 1013, "Not implemented");
pub const SERVICE_ERROR: ErrorCode =
    ErrorCode::new(StatusCode::SERVICE_UNAVAILABLE, 1014, "Service error");
pub const SERVICE_TIMEOUT: ErrorCode =
    ErrorCode::new(StatusCode::SERVICE_UNAVAILABLE, 1015, "Service timeout");
pub const DATABASE_ERROR: ErrorCode =
    ErrorCode::new(StatusCode::INTERNAL_SERVER_ERROR, 1016, "Database error");

// User exceptions
pub const USER_NOT_FOUND: ErrorCode =
    ErrorCode::new(StatusCode::NOT_FOUND, 2000, "User not found");
pub const USER_EMAIL_ALREADY_EXISTS: ErrorCode =
    ErrorCode::new(StatusCode::BAD_REQUEST, 2001, "User email already exists");
pub const USER_PASSWORD_INCORRECT: ErrorCode =
    ErrorCode::new(StatusCode::BAD_REQUEST, 2002, "User password incorrect");

/// Every exception code the API can emit.
pub const REGISTRY: &[ErrorCode] = &[
    INTERNAL_SERVER_ERROR,
    NOT_FOUND,
    BAD_REQUEST,
    INVALID_PARAM,
    UNAUTHORIZED,
    TOKEN_NOT_FOUND,
    TOKEN_EXPIRED,
    TOKEN_GENERATION_FAILED,
    FORBIDDEN,
    TOO_MANY_REQUESTS,
    BAD_GATEWAY,
    SERVICE_UNAVAILABLE,
    GATEWAY_TIMEOUT,
    NOT_IMPLEMENTED,
    SERVICE_ERROR,
    SERVICE_TIMEOUT,
    DATABASE_ERROR,
    USER_NOT_FOUND,
    USER_EMAIL_ALREADY_EXISTS,
    USER_PASSWORD_INCORRECT,
];

/// Returned by [`ensure_unique_codes`] when two entries share a numeric code.
#[derive(Debug, thiserror::Error)]
#[error("exception code {code} already exists ({first:?} / {second:?})")]
pub struct DuplicateCode {
    pub code: i32,
    pub first: &'static str,
    pub second: &'static str,
}

/// Checks that no two entries of `table` share a numeric code.
pub fn ensure_unique_codes(table: &[ErrorCode]) -> Result<(), DuplicateCode> {
    let mut seen: HashMap<i32, &'static str> = HashMap::with_capacity(table.len());
    for entry in table {
        if let Some(first) = seen.insert(entry.code, entry.message) {
            return Err(DuplicateCode {
                code: entry.code,
                first,
                second: entry.message,
            });
        }
    }
    Ok(())
}

/// An error value carried back to the client as `{code, message, details}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} ({}): {}", .kind.message, .kind.code, .details.join("; "))]
pub struct AppException {
    kind: ErrorCode,
    details: Vec<String>,
}

#[derive(Serialize)]
struct ExceptionBody<'a> {
    code: i32,
    message: &'a str,
    details: &'a [String],
}

impl AppException {
    pub fn new(kind: ErrorCode) -> Self {
        Self {
            kind,
            details: Vec::new(),
        }
    }

    /// Returns a new exception with `detail` appended.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    #[must_use]
    pub fn with_details<I, S>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.details.extend(details.into_iter().map(Into::into));
        self
    }

    pub fn kind(&self) -> ErrorCode {
        self.kind
    }

    pub fn code(&self) -> i32 {
        self.kind.code
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status
    }

    pub fn message(&self) -> &'static str {
        self.kind.message
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }

    /// Same exception kind, ignoring details.
    pub fn is(&self, kind: ErrorCode) -> bool {
        self.kind.code == kind.code
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(INTERNAL_SERVER_ERROR).with_detail(detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(UNAUTHORIZED).with_detail(detail)
    }

    pub fn invalid_param<I, S>(details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(INVALID_PARAM).with_details(details)
    }
}

impl From<ErrorCode> for AppException {
    fn from(kind: ErrorCode) -> Self {
        Self::new(kind)
    }
}

impl From<sqlx::Error> for AppException {
    fn from(err: sqlx::Error) -> Self {
        Self::new(DATABASE_ERROR).with_detail(err.to_string())
    }
}

impl From<anyhow::Error> for AppException {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(format!("{err:#}"))
    }
}

impl From<ValidationErrors> for AppException {
    fn from(errors: ValidationErrors) -> Self {
        Self::from_validation(&errors, Locale::default())
    }
}

impl AppException {
    /// `InvalidParam` with one detail per violation, worded for `locale`.
    pub fn from_validation(errors: &ValidationErrors, locale: Locale) -> Self {
        Self::invalid_param(format_validation_errors_in(errors, locale))
    }
}

/// [`format_validation_errors_in`] with the default locale.
pub fn format_validation_errors(errors: &ValidationErrors) -> Vec<String> {
    format_validation_errors_in(errors, Locale::default())
}

/// Flattens validator output into one sentence per violation, sorted.
pub fn format_validation_errors_in(errors: &ValidationErrors, locale: Locale) -> Vec<String> {
    let mut details: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors
                .iter()
                .map(move |error| locale.validation_message(field, error))
        })
        .collect();
    // field_errors() is backed by a HashMap
    details.sort();
    details
}

impl IntoResponse for AppException {
    fn into_response(self) -> Response {
        if self.kind.status.is_server_error() {
            error!(
                code = self.kind.code,
                details = ?self.details,
                "{}", self.kind.message
            );
        }

        let body = ExceptionBody {
            code: self.kind.code,
            message: self.kind.message,
            details: &self.details,
        };

        (self.kind.status, Json(body)).into_response()
    }
}
