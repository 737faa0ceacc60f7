use axum::{
    Router, middleware,
    routing::{get, post},
};

use bastion_models::RoleCode;

use crate::middleware::{
    auth::authenticate,
    role::{RoleGuard, role_guard},
};
use crate::modules::users::controller::{info, login_by_email};
use crate::state::AppState;

pub fn init_users_router(state: &AppState) -> Router<AppState> {
    // route_layer: the last one added runs first
    let protected = Router::new()
        .route("/info", get(info))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::require_any(state.roles.clone(), RoleCode::ALL),
            role_guard,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            authenticate,
        ));

    Router::new()
        .route("/login-by-email", post(login_by_email))
        .merge(protected)
}
