use std::{env, str::FromStr};

/// Reads `key` and parses it, falling back to `default` when unset or unparsable.
pub(crate) fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(env.key = key, env.value = %raw, "ignoring unparsable value");
                default
            }
        },
        Err(_) => default,
    }
}

pub(crate) fn string_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}
