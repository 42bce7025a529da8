//! Account (customer card) data model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A customer card record from the `accounts` table.
///
/// Balances are stored as `i64` cents to avoid floating-point precision
/// issues. `balance_cents` is the posted balance (funds actually removed);
/// `available_balance_cents` is posted minus outstanding authorization
/// holds. At rest, available never exceeds posted. Both columns change only
/// through relative-delta UPDATEs.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Account {
    pub id: Uuid,

    /// External card number, 13-19 digits, unique.
    pub account_number: String,

    pub cvv: String,

    pub expiry_month: i32,

    pub expiry_year: i32,

    /// Posted balance in cents.
    pub balance_cents: i64,

    /// Spendable balance in cents (posted minus active holds).
    pub available_balance_cents: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}
