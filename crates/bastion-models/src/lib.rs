//! # Bastion Models
//!
//! Domain models and DTOs:
//!
//! - [`roles`]: [`Role`] and the fixed [`RoleCode`] set
//! - [`users`]: [`User`] and the login request/response

pub mod roles;
pub mod users;

pub use roles::{Role, RoleCode};
pub use users::{LoginByEmailRequest, LoginByEmailResponse, User};
