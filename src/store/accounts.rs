//! Account lookups and atomic balance adjustment.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::Account;

/// Look up an account by card number.
pub async fn find_by_number(
    executor: impl PgExecutor<'_>,
    account_number: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE account_number = $1")
        .bind(account_number)
        .fetch_optional(executor)
        .await
}

/// Look up an account by card number, locking the row for the enclosing
/// transaction.
pub async fn find_by_number_for_update(
    executor: impl PgExecutor<'_>,
    account_number: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE account_number = $1 FOR UPDATE")
        .bind(account_number)
        .fetch_optional(executor)
        .await
}

/// Look up an account by internal id.
pub async fn find_by_id(
    executor: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Apply posted and available deltas to an account in a single UPDATE.
///
/// Both deltas are relative (`SET x = x + delta`), so concurrent writers
/// cannot lose updates regardless of row locking. Returns the number of
/// rows touched; zero means the account does not exist.
pub async fn adjust_balances(
    executor: impl PgExecutor<'_>,
    account_id: Uuid,
    posted_delta: i64,
    available_delta: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET balance_cents = balance_cents + $2,
            available_balance_cents = available_balance_cents + $3,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(account_id)
    .bind(posted_delta)
    .bind(available_delta)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
