//! # Bastion DB
//!
//! PostgreSQL pool setup and repositories.
//!
//! - [`query`]: composable [`QueryOption`]s
//! - [`repo`]: the generic [`BaseRepo`] over any [`Entity`]
//! - [`users`]: [`UserStore`] and its PostgreSQL implementation
//!
//! # Example
//!
//! ```ignore
//! use bastion_db::{init_db_pool, PgUserRepository, UserStore};
//!
//! let pool = init_db_pool(&config.database).await?;
//! let users = PgUserRepository::new(pool.clone());
//! let admin = users.find_by_email("admin@example.com").await?;
//! ```

pub mod error;
pub mod query;
pub mod repo;
pub mod users;

use sqlx::{Postgres, Transaction, postgres::PgPoolOptions};
use tracing::info;

use bastion_config::DatabaseConfig;

pub use error::RepoError;
pub use query::{BindValue, Direction, QueryOption};
pub use repo::{BaseRepo, Entity};
pub use users::{PgUserRepository, UserStore};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Builds the shared connection pool and checks one connection out.
///
/// Call once at startup; the pool is cheap to clone into application state.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(&config.url)
        .await?;

    info!(
        max_connections = config.max_connections,
        "Database pool initialized"
    );
    Ok(pool)
}

/// Starts a transaction; pass `&mut *tx` to repository calls to run them inside it.
pub async fn begin(pool: &PgPool) -> Result<Transaction<'static, Postgres>, RepoError> {
    Ok(pool.begin().await?)
}
