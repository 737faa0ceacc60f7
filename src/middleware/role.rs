//! Role-based authorization.
//!
//! A [`RoleGuard`] sits behind [`authenticate`](crate::middleware::auth::authenticate)
//! and admits the request only if the identity's roles satisfy its policy.
//! Roles come from the [`RoleResolver`], so most checks are answered from
//! the cache.

use std::{fmt, sync::Arc};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use bastion_auth::{identity_of, missing_identity};
use bastion_core::errors::{AppException, UNAUTHORIZED};
use bastion_models::{RoleCode, roles::codes_of};

use crate::modules::users::roles::RoleResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolePolicy {
    /// Every required role must be held.
    All,
    /// At least one required role must be held.
    Any,
}

impl RolePolicy {
    pub fn permits(self, required: &[RoleCode], held: &[RoleCode]) -> bool {
        match self {
            Self::All => required.iter().all(|role| held.contains(role)),
            Self::Any => required.iter().any(|role| held.contains(role)),
        }
    }
}

struct Codes<'a>(&'a [RoleCode]);

impl fmt::Display for Codes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(code.as_str())?;
        }
        f.write_str("]")
    }
}

#[derive(Clone)]
pub struct RoleGuard {
    resolver: RoleResolver,
    policy: RolePolicy,
    required: Arc<[RoleCode]>,
}

impl RoleGuard {
    pub fn new(
        resolver: RoleResolver,
        policy: RolePolicy,
        required: impl IntoIterator<Item = RoleCode>,
    ) -> Self {
        Self {
            resolver,
            policy,
            required: required.into_iter().collect(),
        }
    }

    pub fn require_all(resolver: RoleResolver, required: impl IntoIterator<Item = RoleCode>) -> Self {
        Self::new(resolver, RolePolicy::All, required)
    }

    pub fn require_any(resolver: RoleResolver, required: impl IntoIterator<Item = RoleCode>) -> Self {
        Self::new(resolver, RolePolicy::Any, required)
    }

    /// Admits or rejects the request's identity.
    ///
    /// A missing identity is rejected before any role lookup. Resolver
    /// failures such as `UserNotFound` are returned unchanged.
    pub async fn check(&self, identity: Option<i64>) -> Result<(), AppException> {
        let user_unique_id = identity.ok_or_else(missing_identity)?;
        let roles = self.resolver.resolve_roles(user_unique_id).await?;
        let held = codes_of(&roles);

        if self.policy.permits(&self.required, &held) {
            return Ok(());
        }

        let detail = match self.policy {
            RolePolicy::All => {
                let missing: Vec<RoleCode> = self
                    .required
                    .iter()
                    .copied()
                    .filter(|role| !held.contains(role))
                    .collect();
                format!("user roles {} lack {}", Codes(&held), Codes(&missing))
            }
            RolePolicy::Any => format!(
                "user roles {} include none of {}",
                Codes(&held),
                Codes(&self.required)
            ),
        };
        Err(AppException::new(UNAUTHORIZED).with_detail(detail))
    }
}

pub async fn role_guard(
    State(guard): State<RoleGuard>,
    req: Request,
    next: Next,
) -> Result<Response, AppException> {
    let identity = identity_of(req.extensions());
    guard.check(identity).await?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_all() {
        let required = [RoleCode::Admin, RoleCode::User];
        assert!(!RolePolicy::All.permits(&required, &[RoleCode::User]));
        assert!(RolePolicy::All.permits(&required, &[RoleCode::User, RoleCode::Admin]));
        assert!(RolePolicy::All.permits(&[], &[]));
    }

    #[test]
    fn test_policy_any() {
        let required = [RoleCode::Admin, RoleCode::User];
        assert!(RolePolicy::Any.permits(&required, &[RoleCode::User]));
        assert!(!RolePolicy::Any.permits(&required, &[RoleCode::SuperAdmin]));
        assert!(!RolePolicy::Any.permits(&[], &[RoleCode::User]));
    }

    #[test]
    fn test_codes_display() {
        let codes = [RoleCode::Admin, RoleCode::User];
        assert_eq!(Codes(&codes).to_string(), "[role:admin, role:user]");
        assert_eq!(Codes(&[]).to_string(), "[]");
    }
}
