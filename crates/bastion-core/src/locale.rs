//! Language of validation messages.
//!
//! Clients pick it with the `locale` request header. A missing header means
//! Chinese; any value that is not recognised falls back to English.

use axum::http::HeaderMap;
use validator::ValidationError;

pub const LOCALE_HEADER: &str = "locale";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    Zh,
    En,
}

impl Locale {
    pub fn from_header(value: Option<&str>) -> Self {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::default();
        };
        // zh, zh-CN, zh_Hans ...
        if raw.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("zh")) {
            Self::Zh
        } else {
            Self::En
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_header(headers.get(LOCALE_HEADER).and_then(|v| v.to_str().ok()))
    }

    /// One human-readable sentence for a failed rule on `field`.
    ///
    /// Known rule codes are translated; anything else uses the rule's own
    /// message, or names the code.
    pub fn validation_message(self, field: &str, error: &ValidationError) -> String {
        let param = |name: &str| error.params.get(name).map(|v| v.to_string());
        let (min, max, equal) = (param("min"), param("max"), param("equal"));

        match (error.code.as_ref(), self) {
            ("required", Self::En) => format!("{field} is a required field"),
            ("required", Self::Zh) => format!("{field}为必填字段"),

            ("email", Self::En) => format!("{field} must be a valid email address"),
            ("email", Self::Zh) => format!("{field}必须是一个有效的邮箱"),

            ("url", Self::En) => format!("{field} must be a valid URL"),
            ("url", Self::Zh) => format!("{field}必须是一个有效的URL"),

            ("length", locale) => match (equal, min, max, locale) {
                (Some(n), _, _, Self::En) => format!("{field} must be {n} characters in length"),
                (Some(n), _, _, Self::Zh) => format!("{field}长度必须是{n}个字符"),
                (None, Some(lo), Some(hi), Self::En) => {
                    format!("{field} must be between {lo} and {hi} characters in length")
                }
                (None, Some(lo), Some(hi), Self::Zh) => {
                    format!("{field}长度必须在{lo}到{hi}个字符之间")
                }
                (None, Some(lo), None, Self::En) => {
                    format!("{field} must be at least {lo} characters in length")
                }
                (None, Some(lo), None, Self::Zh) => format!("{field}长度必须至少为{lo}个字符"),
                (None, None, Some(hi), Self::En) => {
                    format!("{field} must be a maximum of {hi} characters in length")
                }
                (None, None, Some(hi), Self::Zh) => format!("{field}长度不能超过{hi}个字符"),
                (None, None, None, _) => self.fallback(field, error),
            },

            ("range", locale) => match (min, max, locale) {
                (Some(lo), Some(hi), Self::En) => format!("{field} must be between {lo} and {hi}"),
                (Some(lo), Some(hi), Self::Zh) => format!("{field}必须在{lo}到{hi}之间"),
                (Some(lo), None, Self::En) => format!("{field} must be {lo} or greater"),
                (Some(lo), None, Self::Zh) => format!("{field}必须大于或等于{lo}"),
                (None, Some(hi), Self::En) => format!("{field} must be {hi} or less"),
                (None, Some(hi), Self::Zh) => format!("{field}必须小于或等于{hi}"),
                (None, None, _) => self.fallback(field, error),
            },

            _ => self.fallback(field, error),
        }
    }

    fn fallback(self, field: &str, error: &ValidationError) -> String {
        match (&error.message, self) {
            (Some(message), _) => format!("{field} {message}"),
            (None, Self::En) => format!("{field} is invalid ({})", error.code),
            (None, Self::Zh) => format!("{field}无效 ({})", error.code),
        }
    }
}
