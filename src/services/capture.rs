//! Capture service - converts authorization holds into posted debits.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{ErrorCode, ServiceError};
use crate::models::{NewTransaction, Transaction, TransactionStatus, TransactionType};
use crate::services::Capturer;
use crate::store::ledger::LedgerError;
use crate::store::{accounts, ledger};

/// Handles payment capture operations.
pub struct CaptureService {
    pool: DbPool,
}

impl CaptureService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Capturer for CaptureService {
    /// Capture an authorized payment in full.
    ///
    /// The AUTH_HOLD row is locked for the whole transaction; the unique
    /// index on `(reference_id, type)` backstops the lock, so two
    /// concurrent captures can never both insert.
    async fn capture(
        &self,
        authorization_id: Uuid,
        amount: i64,
    ) -> Result<Transaction, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let auth = ledger::find_by_id_for_update(&mut *tx, authorization_id).await?;
        let auth = match auth {
            Some(txn) if txn.transaction_type == TransactionType::AuthHold => txn,
            _ => {
                return Err(ServiceError::new(
                    ErrorCode::AuthorizationNotFound,
                    "authorization not found",
                ))
            }
        };

        if auth.status != TransactionStatus::Active {
            return Err(ServiceError::new(
                ErrorCode::AuthorizationAlreadyUsed,
                "authorization has already been completed or cancelled",
            ));
        }

        // Expiry is observed at read time; no sweeper marks holds EXPIRED.
        if auth.expires_at.is_some_and(|expires_at| Utc::now() > expires_at) {
            return Err(ServiceError::new(
                ErrorCode::AuthorizationExpired,
                "authorization has expired",
            ));
        }

        if amount != auth.amount_cents {
            return Err(ServiceError::new(
                ErrorCode::AmountMismatch,
                "capture amount does not match authorized amount",
            ));
        }

        let capture = NewTransaction {
            id: Uuid::new_v4(),
            account_id: auth.account_id,
            transaction_type: TransactionType::Capture,
            amount_cents: amount,
            currency: auth.currency.clone(),
            reference_id: Some(authorization_id),
            status: TransactionStatus::Completed,
            expires_at: None,
        };

        let capture = match ledger::create(&mut *tx, &capture).await {
            Ok(txn) => txn,
            Err(LedgerError::Duplicate) => {
                return Err(ServiceError::new(
                    ErrorCode::AlreadyCaptured,
                    "authorization has already been captured",
                ))
            }
            Err(LedgerError::Db(err)) => return Err(ServiceError::internal(err)),
        };

        ledger::update_status(&mut *tx, authorization_id, TransactionStatus::Completed).await?;

        let updated = accounts::adjust_balances(&mut *tx, auth.account_id, -amount, 0).await?;
        if updated == 0 {
            return Err(ServiceError::new(
                ErrorCode::InternalError,
                "failed to adjust balance: account not found",
            ));
        }

        tx.commit().await?;

        tracing::info!(
            capture_id = %capture.id,
            authorization_id = %authorization_id,
            amount_cents = capture.amount_cents,
            "authorization captured"
        );

        Ok(capture)
    }

    /// Retrieve a capture by id.
    async fn get_capture(&self, capture_id: Uuid) -> Result<Transaction, ServiceError> {
        let txn = ledger::find_by_id(&self.pool, capture_id).await?;

        match txn {
            Some(txn) if txn.transaction_type == TransactionType::Capture => Ok(txn),
            _ => Err(ServiceError::new(
                ErrorCode::CaptureNotFound,
                "capture not found",
            )),
        }
    }
}
