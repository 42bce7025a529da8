//! Void service - cancels uncaptured authorization holds.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{ErrorCode, ServiceError};
use crate::models::{NewTransaction, Transaction, TransactionStatus, TransactionType};
use crate::services::Voider;
use crate::store::ledger::LedgerError;
use crate::store::{accounts, ledger};

/// Handles authorization void operations.
pub struct VoidService {
    pool: DbPool,
}

impl VoidService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Voider for VoidService {
    /// Cancel an authorization before it is captured, releasing the hold.
    async fn void(&self, authorization_id: Uuid) -> Result<Transaction, ServiceError> {
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

        // Guard against a capture that slipped in before this lock; the
        // unique index would reject the VOID insert anyway, but this gives
        // the caller the precise code.
        let existing_capture =
            ledger::find_by_reference(&mut *tx, authorization_id, TransactionType::Capture)
                .await?;
        if existing_capture.is_some() {
            return Err(ServiceError::new(
                ErrorCode::AlreadyCaptured,
                "cannot void an authorization that has been captured",
            ));
        }

        let void = NewTransaction {
            id: Uuid::new_v4(),
            account_id: auth.account_id,
            transaction_type: TransactionType::Void,
            amount_cents: auth.amount_cents,
            currency: auth.currency.clone(),
            reference_id: Some(authorization_id),
            status: TransactionStatus::Completed,
            expires_at: None,
        };

        let void = match ledger::create(&mut *tx, &void).await {
            Ok(txn) => txn,
            Err(LedgerError::Duplicate) => {
                return Err(ServiceError::new(
                    ErrorCode::AlreadyVoided,
                    "authorization has already been voided",
                ))
            }
            Err(LedgerError::Db(err)) => return Err(ServiceError::internal(err)),
        };

        ledger::update_status(&mut *tx, authorization_id, TransactionStatus::Completed).await?;

        let updated =
            accounts::adjust_balances(&mut *tx, auth.account_id, 0, auth.amount_cents).await?;
        if updated == 0 {
            return Err(ServiceError::new(
                ErrorCode::InternalError,
                "failed to adjust balance: account not found",
            ));
        }

        tx.commit().await?;

        tracing::info!(
            void_id = %void.id,
            authorization_id = %authorization_id,
            amount_cents = void.amount_cents,
            "authorization voided"
        );

        Ok(void)
    }
}
