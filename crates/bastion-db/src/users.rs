//! User persistence.
//!
//! [`PgUserRepository`] builds the user lookups on top of [`BaseRepo<User>`]
//! and eager-loads each user's roles through `user_role_ref`. Callers depend
//! on the [`UserStore`] trait so the store can be swapped in tests.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use bastion_models::{Role, User};

use crate::{
    error::RepoError,
    query::QueryOption,
    repo::{BaseRepo, Entity},
};

impl Entity for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "unique_id",
        "email",
        "mobile",
        "password",
        "salt",
        "nickname",
        "avatar_url",
        "created_at",
        "updated_at",
        "version",
    ];
}

impl Entity for Role {
    const TABLE: &'static str = "user_roles";
    const COLUMNS: &'static [&'static str] =
        &["id", "code", "name", "created_at", "updated_at", "version"];
}

const ROLES_OF_USER: &str = "SELECT r.id, r.code, r.name, r.created_at, r.updated_at, r.version \
     FROM user_roles r \
     JOIN user_role_ref ur ON ur.user_role_id = r.id \
     WHERE ur.user_id = $1 AND r.deleted_at IS NULL \
     ORDER BY r.id";

/// Read access to users, roles included.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// `Ok(None)` when no live user has this unique id.
    async fn find_by_unique_id(&self, unique_id: i64) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

#[derive(Clone, Debug)]
pub struct PgUserRepository {
    pool: PgPool,
    base: BaseRepo<User>,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            base: BaseRepo::new(),
        }
    }

    pub fn base(&self) -> &BaseRepo<User> {
        &self.base
    }

    /// Looks up one user by `options` on `conn` and attaches its roles.
    ///
    /// Pass a transaction (`&mut *tx`) to read inside it.
    pub async fn find_one_with_roles(
        &self,
        conn: &mut PgConnection,
        options: Vec<QueryOption>,
    ) -> Result<Option<User>, RepoError> {
        let Some(mut user) = self.base.find_one(&mut *conn, options).await? else {
            return Ok(None);
        };

        user.roles = sqlx::query_as::<_, Role>(ROLES_OF_USER)
            .bind(user.id)
            .fetch_all(&mut *conn)
            .await?;

        Ok(Some(user))
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_unique_id(&self, unique_id: i64) -> Result<Option<User>, RepoError> {
        let mut conn = self.pool.acquire().await?;
        self.find_one_with_roles(&mut conn, vec![QueryOption::eq("unique_id", unique_id)])
            .await
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let mut conn = self.pool.acquire().await?;
        self.find_one_with_roles(&mut conn, vec![QueryOption::eq("email", email)])
            .await
    }
}
