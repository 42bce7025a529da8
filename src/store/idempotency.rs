//! Idempotency record storage.

use async_trait::async_trait;

use crate::db::DbPool;
use crate::models::IdempotencyRecord;

/// Storage for cached responses keyed by `(key, request_path)`.
///
/// The middleware depends on this trait rather than the pool so tests can
/// substitute an in-memory implementation.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Fetch the cached response for a key and path, if any.
    async fn get(
        &self,
        key: &str,
        request_path: &str,
    ) -> Result<Option<IdempotencyRecord>, sqlx::Error>;

    /// Persist a cached response. If a record already exists for the same
    /// key and path, the first write wins and this is a no-op.
    async fn put(&self, record: &IdempotencyRecord) -> Result<(), sqlx::Error>;
}

/// Postgres-backed idempotency store.
pub struct PgIdempotencyStore {
    pool: DbPool,
}

impl PgIdempotencyStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdempotencyStore for PgIdempotencyStore {
    async fn get(
        &self,
        key: &str,
        request_path: &str,
    ) -> Result<Option<IdempotencyRecord>, sqlx::Error> {
        sqlx::query_as::<_, IdempotencyRecord>(
            "SELECT * FROM idempotency_keys WHERE key = $1 AND request_path = $2",
        )
        .bind(key)
        .bind(request_path)
        .fetch_optional(&self.pool)
        .await
    }

    async fn put(&self, record: &IdempotencyRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO idempotency_keys (key, request_path, response_status, response_body)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (key, request_path) DO NOTHING
            "#,
        )
        .bind(&record.key)
        .bind(&record.request_path)
        .bind(record.response_status)
        .bind(&record.response_body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
