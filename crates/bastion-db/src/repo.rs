//! Generic repository over any [`Entity`].
//!
//! `BaseRepo<T>` holds no connection. Every method takes the executor to run
//! on, so the same call works against the pool or inside a transaction:
//!
//! ```ignore
//! let users = BaseRepo::<User>::new();
//!
//! let admin = users.find_one(&pool, vec![QueryOption::eq("email", "admin@example.com")]).await?;
//!
//! let mut tx = bastion_db::begin(&pool).await?;
//! users.soft_delete(&mut *tx, 42).await?;
//! tx.commit().await?;
//! ```

use std::marker::PhantomData;

use sqlx::{PgConnection, PgExecutor, Postgres, QueryBuilder, postgres::PgRow};

use bastion_core::pagination::PageParams;

use crate::{
    error::RepoError,
    query::{QueryOption, QueryPlan},
};

/// A table-backed row type.
pub trait Entity: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin + 'static {
    const TABLE: &'static str;
    /// Columns selected into the row type, in `FromRow` order.
    const COLUMNS: &'static [&'static str];
    /// Rows carry a `deleted_at` column and are hidden once it is set.
    const SOFT_DELETE: bool = true;
}

#[derive(Debug)]
pub struct BaseRepo<T> {
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for BaseRepo<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BaseRepo<T> {}

impl<T> Default for BaseRepo<T> {
    fn default() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> BaseRepo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn select(&self, plan: &QueryPlan) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(T::COLUMNS.join(", "))
            .push(" FROM ")
            .push(T::TABLE);
        plan.push_where(&mut qb, T::SOFT_DELETE);
        plan.push_order_and_page(&mut qb);
        qb
    }

    fn count_query(&self, plan: &QueryPlan) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
        qb.push(T::TABLE);
        plan.push_where(&mut qb, T::SOFT_DELETE);
        qb
    }

    /// SQL text `find_many` would run; handy for logging and tests.
    pub fn select_sql(&self, options: Vec<QueryOption>) -> Result<String, RepoError> {
        let plan = QueryPlan::new(options)?;
        Ok(self.select(&plan).sql().to_string())
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<T>, RepoError>
    where
        E: PgExecutor<'e>,
    {
        self.find_one(executor, vec![QueryOption::eq("id", id)]).await
    }

    pub async fn find_one<'e, E>(
        &self,
        executor: E,
        mut options: Vec<QueryOption>,
    ) -> Result<Option<T>, RepoError>
    where
        E: PgExecutor<'e>,
    {
        options.push(QueryOption::paginate(1, 1));
        let plan = QueryPlan::new(options)?;
        let mut qb = self.select(&plan);
        let row = qb.build_query_as::<T>().fetch_optional(executor).await?;
        Ok(row)
    }

    pub async fn find_many<'e, E>(
        &self,
        executor: E,
        options: Vec<QueryOption>,
    ) -> Result<Vec<T>, RepoError>
    where
        E: PgExecutor<'e>,
    {
        let plan = QueryPlan::new(options)?;
        let mut qb = self.select(&plan);
        let rows = qb.build_query_as::<T>().fetch_all(executor).await?;
        Ok(rows)
    }

    /// One page of rows plus the number of rows matching the filters.
    ///
    /// Runs two statements, so it needs a connection rather than any executor.
    pub async fn find_page(
        &self,
        conn: &mut PgConnection,
        page: PageParams,
        options: Vec<QueryOption>,
    ) -> Result<(Vec<T>, i64), RepoError> {
        let mut plan = QueryPlan::new(options)?;

        let total: i64 = self
            .count_query(&plan)
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        plan.set_page(page);
        let rows = self
            .select(&plan)
            .build_query_as::<T>()
            .fetch_all(&mut *conn)
            .await?;

        Ok((rows, total))
    }

    pub async fn count<'e, E>(&self, executor: E, options: Vec<QueryOption>) -> Result<i64, RepoError>
    where
        E: PgExecutor<'e>,
    {
        let plan = QueryPlan::new(options)?;
        let total = self
            .count_query(&plan)
            .build_query_scalar::<i64>()
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    /// Marks a row deleted. Returns whether a live row was found.
    pub async fn soft_delete<'e, E>(&self, executor: E, id: i64) -> Result<bool, RepoError>
    where
        E: PgExecutor<'e>,
    {
        if !T::SOFT_DELETE {
            return Err(RepoError::SoftDeleteUnsupported(T::TABLE));
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE ");
        qb.push(T::TABLE)
            .push(" SET deleted_at = NOW(), version = version + 1 WHERE id = ")
            .push_bind(id)
            .push(" AND deleted_at IS NULL");

        let result = qb.build().execute(executor).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn hard_delete<'e, E>(&self, executor: E, id: i64) -> Result<bool, RepoError>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM ");
        qb.push(T::TABLE).push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(executor).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Direction;

    #[derive(sqlx::FromRow)]
    #[allow(dead_code)]
    struct Widget {
        id: i64,
        label: String,
    }

    impl Entity for Widget {
        const TABLE: &'static str = "widgets";
        const COLUMNS: &'static [&'static str] = &["id", "label"];
    }

    #[derive(sqlx::FromRow)]
    #[allow(dead_code)]
    struct Event {
        id: i64,
    }

    impl Entity for Event {
        const TABLE: &'static str = "events";
        const COLUMNS: &'static [&'static str] = &["id"];
        const SOFT_DELETE: bool = false;
    }

    #[test]
    fn test_select_sql() {
        let repo = BaseRepo::<Widget>::new();
        let sql = repo
            .select_sql(vec![
                QueryOption::eq("label", "gear"),
                QueryOption::order_by("id", Direction::Asc),
            ])
            .unwrap();
        assert_eq!(
            sql,
            "SELECT id, label FROM widgets WHERE deleted_at IS NULL AND label = $1 ORDER BY id ASC"
        );
    }

    #[test]
    fn test_select_sql_without_soft_delete() {
        let repo = BaseRepo::<Event>::new();
        assert_eq!(repo.select_sql(vec![]).unwrap(), "SELECT id FROM events");
    }

    #[test]
    fn test_count_ignores_order_and_page() {
        let repo = BaseRepo::<Widget>::new();
        let plan = QueryPlan::new(vec![
            QueryOption::eq("label", "gear"),
            QueryOption::order_by("id", Direction::Desc),
            QueryOption::paginate(2, 10),
        ])
        .unwrap();
        assert_eq!(
            repo.count_query(&plan).sql(),
            "SELECT COUNT(*) FROM widgets WHERE deleted_at IS NULL AND label = $1"
        );
    }

    #[test]
    fn test_select_sql_rejects_bad_identifier() {
        let repo = BaseRepo::<Widget>::new();
        assert!(matches!(
            repo.select_sql(vec![QueryOption::eq("label = 'x' --", "y")]),
            Err(RepoError::InvalidIdentifier(_))
        ));
    }
}
