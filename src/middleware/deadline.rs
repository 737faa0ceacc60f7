use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use bastion_core::errors::{AppException, SERVICE_TIMEOUT};

/// Bounds the whole request by `limit`.
///
/// On expiry the inner future is dropped, which cancels any cache or store
/// call still in flight, and the client gets a `ServiceTimeout` envelope.
pub async fn request_deadline(
    State(limit): State<Duration>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();

    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(%path, limit_ms = limit.as_millis() as u64, "Request deadline exceeded");
            AppException::new(SERVICE_TIMEOUT)
                .with_detail(format!("request exceeded {} ms", limit.as_millis()))
                .into_response()
        }
    }
}
