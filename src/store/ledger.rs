//! Ledger (transaction) persistence.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{NewTransaction, Transaction, TransactionStatus, TransactionType};

/// Errors from ledger writes.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A row with the same `(reference_id, type)` already exists. This is
    /// the partial unique index rejecting a second CAPTURE, VOID, or REFUND
    /// against the same parent.
    #[error("duplicate transaction")]
    Duplicate,

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Insert a ledger entry and return the stored row.
pub async fn create(
    executor: impl PgExecutor<'_>,
    txn: &NewTransaction,
) -> Result<Transaction, LedgerError> {
    let result = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            id, account_id, type, amount_cents, currency,
            reference_id, status, expires_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(txn.id)
    .bind(txn.account_id)
    .bind(txn.transaction_type)
    .bind(txn.amount_cents)
    .bind(&txn.currency)
    .bind(txn.reference_id)
    .bind(txn.status)
    .bind(txn.expires_at)
    .fetch_one(executor)
    .await;

    match result {
        Ok(row) => Ok(row),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(LedgerError::Duplicate)
        }
        Err(err) => Err(LedgerError::Db(err)),
    }
}

/// Look up a ledger entry by id.
pub async fn find_by_id(
    executor: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Look up a ledger entry by id, locking the row for the enclosing
/// transaction. This is the lock held on the parent during capture, void,
/// and refund so its state cannot change underneath the operation.
pub async fn find_by_id_for_update(
    executor: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Find the child of a given type referencing a parent entry.
pub async fn find_by_reference(
    executor: impl PgExecutor<'_>,
    reference_id: Uuid,
    transaction_type: TransactionType,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE reference_id = $1 AND type = $2",
    )
    .bind(reference_id)
    .bind(transaction_type)
    .fetch_optional(executor)
    .await
}

/// Update the status of a ledger entry.
pub async fn update_status(
    executor: impl PgExecutor<'_>,
    id: Uuid,
    status: TransactionStatus,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE transactions SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
