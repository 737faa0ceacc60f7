use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{debug, warn};

use bastion_auth::{NEW_TOKEN_HEADER, TokenService, bind_identity, extract_token};
use bastion_core::errors::AppException;
use bastion_observability::{track_token_issued, track_token_refreshed};

/// Verifies the request's token and binds its subject as the request identity.
///
/// Fails with `TokenNotFound` when no token is present and `TokenExpired`
/// when it does not verify. A token past its refresh point still passes; the
/// response then carries a replacement in the `New-Token` header.
pub async fn authenticate(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppException> {
    let token = extract_token(req.uri(), req.headers())?;
    let claims = tokens.verify(&token)?;

    let replacement = if claims.is_refresh_due(Utc::now().timestamp()) {
        let issued = tokens.issue(claims.user_unique_id)?;
        track_token_issued("refresh");
        track_token_refreshed();
        debug!(user_unique_id = claims.user_unique_id, "Issued replacement token");
        Some(issued.token)
    } else {
        None
    };

    bind_identity(req.extensions_mut(), claims.user_unique_id);

    let mut response = next.run(req).await;

    if let Some(token) = replacement {
        match HeaderValue::from_str(&token) {
            Ok(value) => {
                response.headers_mut().insert(NEW_TOKEN_HEADER, value);
            }
            Err(e) => warn!(error = %e, "Replacement token is not a valid header value"),
        }
    }

    Ok(response)
}
