//! Data access layer.
//!
//! Store functions take `impl PgExecutor` so the same query runs against
//! the pool for plain reads or against an open transaction when the caller
//! needs the row lock held for the rest of the transaction.

pub mod accounts;
pub mod idempotency;
pub mod ledger;
