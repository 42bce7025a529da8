//! Ledger entry and idempotency-record data models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Lifecycle event kind recorded in the ledger.
///
/// Maps to the Postgres enum `transaction_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Funds reserved against available balance, pending capture or void.
    AuthHold,
    /// Authorized funds posted as a debit.
    Capture,
    /// Cancelled authorization; the hold is released.
    Void,
    /// Reversal of a capture.
    Refund,
}

/// Ledger entry status. Maps to the Postgres enum `transaction_status`.
///
/// AUTH_HOLD rows are created ACTIVE and move to COMPLETED when captured or
/// voided; CAPTURE, VOID, and REFUND rows are created COMPLETED. EXPIRED is
/// an observed state derived from `expires_at`; nothing writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Active,
    Completed,
    Expired,
}

/// An append-only ledger entry from the `transactions` table.
///
/// `reference_id` links a child to its parent: CAPTURE and VOID reference
/// the AUTH_HOLD they consume, REFUND references the CAPTURE it reverses,
/// and AUTH_HOLD rows carry no reference. A partial unique index on
/// `(reference_id, type)` guarantees each parent has at most one child of a
/// given kind.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Transaction {
    pub id: Uuid,

    pub account_id: Uuid,

    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Amount in cents, always positive.
    pub amount_cents: i64,

    pub currency: String,

    /// Parent ledger entry, if any.
    pub reference_id: Option<Uuid>,

    pub status: TransactionStatus,

    /// Instant the hold lapses. Set on AUTH_HOLD rows only.
    pub expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// Payload for inserting a ledger entry.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount_cents: i64,
    pub currency: String,
    pub reference_id: Option<Uuid>,
    pub status: TransactionStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A cached response for a prior mutating request.
///
/// Keyed by `(key, request_path)`; the stored status and body bytes are
/// replayed verbatim so a retried request observes the original response.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IdempotencyRecord {
    pub key: String,
    pub request_path: String,
    pub response_status: i32,
    pub response_body: Vec<u8>,
    pub created_at: DateTime<Utc>,
}
