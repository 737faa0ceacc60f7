use serde::{Deserialize, Serialize};

/// Payload of a session token.
///
/// Timestamps are Unix seconds. `refresh_at` sits two thirds of the way
/// between `iat` and `exp`; past it the token still verifies but is due for
/// replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userUniqueId")]
    pub user_unique_id: i64,
    #[serde(rename = "refreshAt")]
    pub refresh_at: i64,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// Token id; keeps two tokens minted in the same second distinct.
    pub jti: String,
}

impl Claims {
    pub fn is_refresh_due(&self, now_secs: i64) -> bool {
        now_secs > self.refresh_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let claims = Claims {
            user_unique_id: 42,
            refresh_at: 200,
            iss: "bastion".into(),
            iat: 100,
            exp: 250,
            jti: "a".into(),
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userUniqueId"], 42);
        assert_eq!(json["refreshAt"], 200);
        assert!(json.get("user_unique_id").is_none());
    }

    #[test]
    fn test_refresh_due_is_strictly_after() {
        let claims = Claims {
            user_unique_id: 1,
            refresh_at: 200,
            iss: String::new(),
            iat: 0,
            exp: 300,
            jti: String::new(),
        };
        assert!(!claims.is_refresh_due(200));
        assert!(claims.is_refresh_due(201));
    }
}
