//! Authorization service - places holds on customer cards.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{ErrorCode, ServiceError};
use crate::models::{NewTransaction, Transaction, TransactionStatus, TransactionType};
use crate::services::{validators, Authorizer};
use crate::store::{accounts, ledger};

/// Handles payment authorization operations.
pub struct AuthorizationService {
    pool: DbPool,
    auth_expiry: Duration,
}

impl AuthorizationService {
    pub fn new(pool: DbPool, auth_expiry_hours: i64) -> Self {
        Self {
            pool,
            auth_expiry: Duration::hours(auth_expiry_hours),
        }
    }
}

#[async_trait]
impl Authorizer for AuthorizationService {
    /// Create an authorization hold on a customer's account.
    ///
    /// Runs in one database transaction with the account row locked:
    /// validate inputs, check CVV / expiry / available funds, insert an
    /// ACTIVE AUTH_HOLD, and move `available` down by the amount. Posted
    /// balance is untouched until capture.
    async fn authorize(
        &self,
        card_number: &str,
        cvv: &str,
        amount: i64,
    ) -> Result<Transaction, ServiceError> {
        validators::validate_luhn(card_number)?;
        validators::validate_cvv(cvv)?;
        validators::validate_amount(amount)?;

        let mut tx = self.pool.begin().await?;

        // An unknown card reports the same code as a malformed one, so the
        // caller cannot probe which card numbers exist.
        let account = accounts::find_by_number_for_update(&mut *tx, card_number)
            .await?
            .ok_or_else(|| {
                ServiceError::new(ErrorCode::InvalidCard, "card not found or invalid")
            })?;

        if account.cvv != cvv {
            return Err(ServiceError::new(
                ErrorCode::InvalidCvv,
                "CVV does not match",
            ));
        }

        validators::validate_expiry(account.expiry_month, account.expiry_year)?;

        if account.available_balance_cents < amount {
            return Err(ServiceError::new(
                ErrorCode::InsufficientFunds,
                "insufficient funds",
            ));
        }

        let auth = NewTransaction {
            id: Uuid::new_v4(),
            account_id: account.id,
            transaction_type: TransactionType::AuthHold,
            amount_cents: amount,
            currency: "USD".to_string(),
            reference_id: None,
            status: TransactionStatus::Active,
            expires_at: Some(Utc::now() + self.auth_expiry),
        };

        let auth = ledger::create(&mut *tx, &auth)
            .await
            .map_err(ServiceError::internal)?;

        let updated = accounts::adjust_balances(&mut *tx, account.id, 0, -amount).await?;
        if updated == 0 {
            return Err(ServiceError::new(
                ErrorCode::InternalError,
                "failed to adjust balance: account not found",
            ));
        }

        tx.commit().await?;

        tracing::info!(
            authorization_id = %auth.id,
            account_id = %auth.account_id,
            amount_cents = auth.amount_cents,
            "authorization hold created"
        );

        Ok(auth)
    }

    /// Retrieve an authorization by id.
    async fn get_authorization(
        &self,
        authorization_id: Uuid,
    ) -> Result<Transaction, ServiceError> {
        let txn = ledger::find_by_id(&self.pool, authorization_id).await?;

        match txn {
            Some(txn) if txn.transaction_type == TransactionType::AuthHold => Ok(txn),
            _ => Err(ServiceError::new(
                ErrorCode::AuthorizationNotFound,
                "authorization not found",
            )),
        }
    }
}
