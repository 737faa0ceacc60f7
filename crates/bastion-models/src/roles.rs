//! Roles and the fixed set of role codes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stable role identifier. The set is fixed; roles are not user-creatable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleCode {
    #[serde(rename = "role:super_admin")]
    SuperAdmin,
    #[serde(rename = "role:admin")]
    Admin,
    #[serde(rename = "role:user")]
    User,
}

impl RoleCode {
    pub const ALL: [RoleCode; 3] = [RoleCode::SuperAdmin, RoleCode::Admin, RoleCode::User];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "role:super_admin",
            Self::Admin => "role:admin",
            Self::User => "role:user",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::Admin => "Admin",
            Self::User => "User",
        }
    }
}

impl fmt::Display for RoleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role code {0:?}")]
pub struct UnknownRoleCode(pub String);

impl TryFrom<String> for RoleCode {
    type Error = UnknownRoleCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == value)
            .ok_or(UnknownRoleCode(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    #[sqlx(try_from = "String")]
    pub code: RoleCode,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i64,
}

/// Role codes of `roles`, in order.
pub fn codes_of(roles: &[Role]) -> Vec<RoleCode> {
    roles.iter().map(|role| role.code).collect()
}
