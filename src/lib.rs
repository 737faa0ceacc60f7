//! # Bastion
//!
//! An HTTP service whose interesting part is the request pipeline in front of
//! the handlers: token authentication with silent refresh, and role checks
//! backed by a cache-aside role lookup.
//!
//! ## Layout
//!
//! ```text
//! crates/
//! ├── bastion-core/           # exceptions, envelopes, pagination, passwords
//! ├── bastion-config/         # env-driven configuration
//! ├── bastion-auth/           # tokens, claims, request identity
//! ├── bastion-cache/          # cache store (Redis / in-memory)
//! ├── bastion-models/         # users, roles, DTOs
//! ├── bastion-db/             # pool, base repository, user repository
//! └── bastion-observability/  # tracing setup, request logs, metrics
//! src/
//! ├── middleware/   # authenticate, role_guard, deadline, panic recovery
//! ├── modules/      # hello, users (controller / service / router / roles)
//! ├── router.rs     # route tree and outer layers
//! └── state.rs      # shared application state
//! ```
//!
//! ## Request flow for a protected route
//!
//! 1. `logging_middleware` and `metrics_middleware` wrap everything.
//! 2. Panics become an `InternalServerError` envelope.
//! 3. The request deadline turns a slow request into `ServiceTimeout`.
//! 4. [`middleware::auth::authenticate`] extracts and verifies the token,
//!    binds the subject and attaches `New-Token` when a refresh is due.
//! 5. [`middleware::role::role_guard`] resolves roles through
//!    [`modules::users::roles::RoleResolver`] and applies the policy.
//! 6. The handler returns exactly one `Result<_, AppException>`.

pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

#[cfg(feature = "test-utils")]
pub mod testing;
