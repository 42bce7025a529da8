//! Database connection pool and migration management.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::config::Config;

/// Type alias for the PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool sized from configuration.
///
/// Connections are created lazily up to `DB_MAX_CONNECTIONS`, with
/// `DB_MIN_CONNECTIONS` kept warm and each connection recycled after
/// `DB_CONN_MAX_LIFETIME_SECS`.
pub async fn create_pool(config: &Config) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .max_lifetime(Duration::from_secs(config.db_conn_max_lifetime_secs))
        .connect(&config.database_url())
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// The macro embeds the migration files at compile time; applied versions
/// are tracked in `_sqlx_migrations` so each migration runs once.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
