//! Payment services - the lifecycle state machine and balance effects.
//!
//! The HTTP layer depends on the capability traits below rather than the
//! concrete services, so tests can substitute in-memory stubs. Each
//! concrete service runs its operation inside a single database
//! transaction with a row-level lock on the principal row; dropping the
//! `sqlx::Transaction` on any error path rolls everything back, so a
//! caller disconnect mid-flight leaves no partial writes.

pub mod authorization;
pub mod capture;
pub mod refund;
pub mod validators;
pub mod void;

pub use authorization::AuthorizationService;
pub use capture::CaptureService;
pub use refund::RefundService;
pub use void::VoidService;

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::ServiceError;
use crate::models::Transaction;

/// Places an authorization hold on a customer card.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(
        &self,
        card_number: &str,
        cvv: &str,
        amount: i64,
    ) -> Result<Transaction, ServiceError>;

    async fn get_authorization(&self, authorization_id: Uuid)
        -> Result<Transaction, ServiceError>;
}

/// Converts an authorization hold into a posted debit.
#[async_trait]
pub trait Capturer: Send + Sync {
    async fn capture(
        &self,
        authorization_id: Uuid,
        amount: i64,
    ) -> Result<Transaction, ServiceError>;

    async fn get_capture(&self, capture_id: Uuid) -> Result<Transaction, ServiceError>;
}

/// Cancels an uncaptured authorization hold.
#[async_trait]
pub trait Voider: Send + Sync {
    async fn void(&self, authorization_id: Uuid) -> Result<Transaction, ServiceError>;
}

/// Reverses a capture.
#[async_trait]
pub trait Refunder: Send + Sync {
    async fn refund(&self, capture_id: Uuid, amount: i64) -> Result<Transaction, ServiceError>;

    async fn get_refund(&self, refund_id: Uuid) -> Result<Transaction, ServiceError>;
}

/// Validates system health.
#[async_trait]
pub trait HealthChecker: Send + Sync {
    async fn ping(&self) -> Result<(), ServiceError>;
}

/// Health checker backed by a database round trip.
pub struct PgHealthChecker {
    pool: DbPool,
}

impl PgHealthChecker {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthChecker for PgHealthChecker {
    async fn ping(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
