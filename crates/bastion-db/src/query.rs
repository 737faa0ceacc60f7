//! Composable query options.
//!
//! A query is a list of [`QueryOption`]s applied in order. Filters are
//! AND-ed, `OrderBy`s accumulate, the last `Paginate` wins. Column names are
//! checked against [`is_valid_identifier`]; raw `Where` predicates are
//! trusted SQL written by the caller and use `?` for each bound value.
//!
//! ```ignore
//! use bastion_db::query::{Direction, QueryOption};
//!
//! let options = vec![
//!     QueryOption::eq("email", "admin@example.com"),
//!     QueryOption::filter("created_at > NOW() - INTERVAL '1 day' OR version > ?", [3_i64]),
//!     QueryOption::order_by("id", Direction::Desc),
//!     QueryOption::paginate(2, 10),
//! ];
//! ```

use std::fmt;

use sqlx::{Postgres, QueryBuilder};

use bastion_core::pagination::PageParams;

use crate::error::RepoError;

/// A value bound to a `$n` parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    I64(i64),
    Text(String),
    Bool(bool),
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for BindValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl BindValue {
    pub(crate) fn push_to(self, qb: &mut QueryBuilder<'static, Postgres>) {
        match self {
            Self::I64(v) => qb.push_bind(v),
            Self::Text(v) => qb.push_bind(v),
            Self::Bool(v) => qb.push_bind(v),
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOption {
    /// `column = value`
    Eq(String, BindValue),
    /// Raw predicate with `?` placeholders.
    Where(String, Vec<BindValue>),
    OrderBy(String, Direction),
    /// 1-indexed page and page size, normalised like [`PageParams`].
    Paginate(i64, i64),
    /// Include soft-deleted rows.
    WithDeleted,
}

impl QueryOption {
    pub fn eq(column: impl Into<String>, value: impl Into<BindValue>) -> Self {
        Self::Eq(column.into(), value.into())
    }

    pub fn filter<I, V>(predicate: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<BindValue>,
    {
        Self::Where(predicate.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn order_by(column: impl Into<String>, direction: Direction) -> Self {
        Self::OrderBy(column.into(), direction)
    }

    pub fn paginate(page: i64, page_size: i64) -> Self {
        Self::Paginate(page, page_size)
    }
}

/// Lowercase snake-case names, optionally qualified (`u.email`).
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_lowercase())
                && chars.all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

fn checked(name: String) -> Result<String, RepoError> {
    if is_valid_identifier(&name) {
        Ok(name)
    } else {
        Err(RepoError::InvalidIdentifier(name))
    }
}

#[derive(Debug, Clone)]
enum Filter {
    Eq(String, BindValue),
    Raw(String, Vec<BindValue>),
}

/// Options after validation, ready to render.
#[derive(Debug, Clone, Default)]
pub(crate) struct QueryPlan {
    filters: Vec<Filter>,
    order: Vec<(String, Direction)>,
    page: Option<PageParams>,
    with_deleted: bool,
}

impl QueryPlan {
    pub(crate) fn new(options: Vec<QueryOption>) -> Result<Self, RepoError> {
        let mut plan = Self::default();
        for option in options {
            match option {
                QueryOption::Eq(column, value) => {
                    plan.filters.push(Filter::Eq(checked(column)?, value));
                }
                QueryOption::Where(predicate, values) => {
                    let placeholders = predicate.matches('?').count();
                    if placeholders != values.len() {
                        return Err(RepoError::PlaceholderMismatch {
                            predicate,
                            placeholders,
                            values: values.len(),
                        });
                    }
                    plan.filters.push(Filter::Raw(predicate, values));
                }
                QueryOption::OrderBy(column, direction) => {
                    plan.order.push((checked(column)?, direction));
                }
                QueryOption::Paginate(page, page_size) => {
                    plan.page = Some(PageParams::new(page, page_size));
                }
                QueryOption::WithDeleted => plan.with_deleted = true,
            }
        }
        Ok(plan)
    }

    pub(crate) fn set_page(&mut self, page: PageParams) {
        self.page = Some(page);
    }

    /// Appends ` WHERE ...` if there is anything to filter on.
    pub(crate) fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>, soft_delete: bool) {
        let mut first = true;
        let mut next_clause = |qb: &mut QueryBuilder<'static, Postgres>| {
            qb.push(if first { " WHERE " } else { " AND " });
            first = false;
        };

        if soft_delete && !self.with_deleted {
            next_clause(qb);
            qb.push("deleted_at IS NULL");
        }

        for filter in &self.filters {
            next_clause(qb);
            match filter.clone() {
                Filter::Eq(column, value) => {
                    qb.push(column).push(" = ");
                    value.push_to(qb);
                }
                Filter::Raw(predicate, values) => {
                    qb.push("(");
                    let mut values = values.into_iter();
                    let mut pieces = predicate.split('?').peekable();
                    while let Some(piece) = pieces.next() {
                        qb.push(piece);
                        if pieces.peek().is_some() {
                            if let Some(value) = values.next() {
                                value.push_to(qb);
                            }
                        }
                    }
                    qb.push(")");
                }
            }
        }
    }

    pub(crate) fn push_order_and_page(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        for (i, (column, direction)) in self.order.iter().enumerate() {
            qb.push(if i == 0 { " ORDER BY " } else { ", " });
            qb.push(column).push(" ").push(direction.to_string());
        }

        if let Some(page) = &self.page {
            qb.push(" LIMIT ").push_bind(page.page_size());
            qb.push(" OFFSET ").push_bind(page.offset());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(options: Vec<QueryOption>, soft_delete: bool) -> String {
        let plan = QueryPlan::new(options).unwrap();
        let mut qb = QueryBuilder::new("SELECT id FROM users");
        plan.push_where(&mut qb, soft_delete);
        plan.push_order_and_page(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_identifier_rules() {
        assert!(is_valid_identifier("unique_id"));
        assert!(is_valid_identifier("u.email"));
        assert!(is_valid_identifier("_private2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("Email"));
        assert!(!is_valid_identifier("id; DROP TABLE users"));
        assert!(!is_valid_identifier("2fa"));
        assert!(!is_valid_identifier("u."));
    }

    #[test]
    fn test_soft_delete_filter_is_default() {
        assert_eq!(render(vec![], true), "SELECT id FROM users WHERE deleted_at IS NULL");
        assert_eq!(render(vec![QueryOption::WithDeleted], true), "SELECT id FROM users");
        assert_eq!(render(vec![], false), "SELECT id FROM users");
    }

    #[test]
    fn test_options_compose_in_order() {
        let sql = render(
            vec![
                QueryOption::eq("email", "a@b.c"),
                QueryOption::filter("version > ? OR unique_id = ?", [1_i64, 2]),
                QueryOption::order_by("id", Direction::Desc),
                QueryOption::order_by("email", Direction::Asc),
                QueryOption::paginate(3, 10),
            ],
            true,
        );
        assert_eq!(
            sql,
            "SELECT id FROM users WHERE deleted_at IS NULL AND email = $1 \
             AND (version > $2 OR unique_id = $3) ORDER BY id DESC, email ASC \
             LIMIT $4 OFFSET $5"
        );
    }

    #[test]
    fn test_last_paginate_wins() {
        let plan = QueryPlan::new(vec![
            QueryOption::paginate(1, 10),
            QueryOption::paginate(4, 20),
        ])
        .unwrap();
        assert_eq!(plan.page, Some(PageParams::new(4, 20)));
    }

    #[test]
    fn test_rejects_bad_column() {
        let err = QueryPlan::new(vec![QueryOption::eq("email OR 1=1", "x")]).unwrap_err();
        assert!(matches!(err, RepoError::InvalidIdentifier(_)));

        let err = QueryPlan::new(vec![QueryOption::order_by("id desc", Direction::Asc)]).unwrap_err();
        assert!(matches!(err, RepoError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_rejects_placeholder_mismatch() {
        let err = QueryPlan::new(vec![QueryOption::filter("a = ? AND b = ?", [1_i64])]).unwrap_err();
        assert!(matches!(
            err,
            RepoError::PlaceholderMismatch {
                placeholders: 2,
                values: 1,
                ..
            }
        ));
    }
}
