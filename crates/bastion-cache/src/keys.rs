//! Cache key builders. Keys are shared with other services reading the same
//! Redis, so their layout is fixed.

fn build_key(parts: &[&str]) -> String {
    parts.join(":")
}

pub mod users {
    use super::*;

    /// Role set of a user, by unique id.
    pub fn roles(user_unique_id: i64) -> String {
        build_key(&["user", "roles", &user_unique_id.to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_roles_key() {
        assert_eq!(users::roles(1234567890), "user:roles:1234567890");
        assert_eq!(users::roles(-1), "user:roles:-1");
    }
}
