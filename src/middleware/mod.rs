//! Request pipeline stages.
//!
//! Order, outermost first: request logging, metrics, panic boundary, CORS,
//! request deadline, then per-route [`auth::authenticate`] followed by
//! [`role::role_guard`].
//!
//! ```ignore
//! Router::new()
//!     .route("/info", get(info))
//!     .route_layer(from_fn_with_state(RoleGuard::require_any(roles, RoleCode::ALL), role_guard))
//!     .route_layer(from_fn_with_state(tokens, authenticate));
//! ```

pub mod auth;
pub mod deadline;
pub mod recovery;
pub mod role;
