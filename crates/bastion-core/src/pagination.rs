//! Page-based pagination parameters.
//!
//! `page` is 1-indexed; a missing or non-positive page means 1. A missing or
//! non-positive `pageSize` means 5, and anything above 100 is capped. Empty
//! query values (`?page=`) are treated as absent.

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 100;

fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page_size: Option<i64>,
}

impl PageParams {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    #[must_use]
    pub fn page_size(&self) -> i64 {
        match self.page_size {
            Some(size) if size > 0 => size.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    /// Rows to skip before the current page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.page_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 5);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_offset_from_page() {
        let params = PageParams::new(3, 20);
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_page_size_bounds() {
        assert_eq!(PageParams::new(1, 500).page_size(), 100);
        assert_eq!(PageParams::new(1, 0).page_size(), 5);
        assert_eq!(PageParams::new(1, -4).page_size(), 5);
    }

    #[test]
    fn test_page_floor_is_one() {
        let params = PageParams::new(-2, 10);
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_deserialize_camel_case_and_empty() {
        let params: PageParams = serde_json::from_str(r#"{"page":"2","pageSize":""}"#).unwrap();
        assert_eq!(params.page, Some(2));
        assert_eq!(params.page_size, None);
        assert_eq!(params.page_size(), 5);
    }
}
