//! Refund service - reverses captured payments.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{ErrorCode, ServiceError};
use crate::models::{NewTransaction, Transaction, TransactionStatus, TransactionType};
use crate::services::Refunder;
use crate::store::ledger::LedgerError;
use crate::store::{accounts, ledger};

/// Handles refund operations.
pub struct RefundService {
    pool: DbPool,
}

impl RefundService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Refunder for RefundService {
    /// Refund a captured payment in full, restoring both balances.
    async fn refund(&self, capture_id: Uuid, amount: i64) -> Result<Transaction, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let capture = ledger::find_by_id_for_update(&mut *tx, capture_id).await?;
        let capture = match capture {
            Some(txn) if txn.transaction_type == TransactionType::Capture => txn,
            _ => {
                return Err(ServiceError::new(
                    ErrorCode::CaptureNotFound,
                    "capture not found",
                ))
            }
        };

        if capture.status != TransactionStatus::Completed {
            return Err(ServiceError::new(
                ErrorCode::CaptureNotFound,
                "capture is not in completed status",
            ));
        }

        if amount != capture.amount_cents {
            return Err(ServiceError::new(
                ErrorCode::AmountMismatch,
                format!(
                    "refund amount ({}) must equal capture amount ({})",
                    amount, capture.amount_cents
                ),
            ));
        }

        let refund = NewTransaction {
            id: Uuid::new_v4(),
            account_id: capture.account_id,
            transaction_type: TransactionType::Refund,
            amount_cents: amount,
            currency: capture.currency.clone(),
            reference_id: Some(capture_id),
            status: TransactionStatus::Completed,
            expires_at: None,
        };

        let refund = match ledger::create(&mut *tx, &refund).await {
            Ok(txn) => txn,
            Err(LedgerError::Duplicate) => {
                return Err(ServiceError::new(
                    ErrorCode::AlreadyRefunded,
                    "capture has already been refunded",
                ))
            }
            Err(LedgerError::Db(err)) => return Err(ServiceError::internal(err)),
        };

        let updated =
            accounts::adjust_balances(&mut *tx, capture.account_id, amount, amount).await?;
        if updated == 0 {
            return Err(ServiceError::new(
                ErrorCode::InternalError,
                "failed to adjust balance: account not found",
            ));
        }

        tx.commit().await?;

        tracing::info!(
            refund_id = %refund.id,
            capture_id = %capture_id,
            amount_cents = refund.amount_cents,
            "capture refunded"
        );

        Ok(refund)
    }

    /// Retrieve a refund by id.
    async fn get_refund(&self, refund_id: Uuid) -> Result<Transaction, ServiceError> {
        let txn = ledger::find_by_id(&self.pool, refund_id).await?;

        match txn {
            Some(txn) if txn.transaction_type == TransactionType::Refund => Ok(txn),
            _ => Err(ServiceError::new(ErrorCode::NotFound, "refund not found")),
        }
    }
}
