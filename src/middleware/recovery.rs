use std::any::Any;

use axum::response::{IntoResponse, Response};
use tracing::error;

use bastion_core::errors::{AppException, INTERNAL_SERVER_ERROR};

/// Panic handler for `CatchPanicLayer::custom`.
///
/// The panic message is logged but never sent to the client.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    error!(panic = %message, "Request handler panicked");

    AppException::new(INTERNAL_SERVER_ERROR)
        .with_detail("unexpected fault while handling the request")
        .into_response()
}
