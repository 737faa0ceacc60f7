//! User entity and login DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::roles::Role;

/// A user with its roles.
///
/// `roles` is not a column; repositories fill it in after loading the row.
/// Credentials never leave the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub unique_id: i64,
    pub email: String,
    pub mobile: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing)]
    pub salt: String,
    pub nickname: String,
    pub avatar_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i64,
    #[sqlx(skip)]
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginByEmailRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 64))]
    pub password: String,
}

/// Instants are Unix milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginByEmailResponse {
    pub token: String,
    pub expire_at: i64,
    pub refresh_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::RoleCode;

    fn user() -> User {
        User {
            id: 1,
            unique_id: 1001,
            email: "admin@example.com".into(),
            mobile: String::new(),
            password: "hash".into(),
            salt: "salt".into(),
            nickname: "admin".into(),
            avatar_url: String::new(),
            created_at: None,
            updated_at: None,
            version: 0,
            roles: vec![Role {
                id: 2,
                code: RoleCode::Admin,
                name: "Admin".into(),
                created_at: None,
                updated_at: None,
                version: 0,
            }],
        }
    }

    #[test]
    fn test_credentials_not_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("salt").is_none());
        assert_eq!(json["uniqueId"], 1001);
        assert_eq!(json["roles"][0]["code"], "role:admin");
    }

    #[test]
    fn test_login_request_validation() {
        let ok = LoginByEmailRequest {
            email: "admin@example.com".into(),
            password: "123456".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginByEmailRequest {
            email: "admin".into(),
            password: "123".into(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_password_upper_bound() {
        let long = LoginByEmailRequest {
            email: "admin@example.com".into(),
            password: "x".repeat(65),
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_login_response_camel_case() {
        let response = LoginByEmailResponse {
            token: "t".into(),
            expire_at: 2,
            refresh_at: 1,
        };
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["expireAt"], 2);
        assert_eq!(json["refreshAt"], 1);
    }
}
