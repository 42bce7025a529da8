//! Mock card-issuing bank API.
//!
//! A REST server implementing the classic card payment lifecycle -
//! authorize, capture, void, refund - against customer accounts held in
//! PostgreSQL.
//!
//! # Architecture
//!
//! - **Web framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Format**: JSON requests/responses
//!
//! # Correctness model
//!
//! Money movement is at-most-once through two stacked mechanisms:
//!
//! 1. An HTTP idempotency cache replays the original response for a
//!    repeated `Idempotency-Key`.
//! 2. A partial unique index on `transactions(reference_id, type)` is the
//!    source of truth - even without a key, an authorization can gain at
//!    most one capture or void, and a capture at most one refund.
//!
//! Every mutating operation runs in a single database transaction with a
//! row lock on the row it consumes, and balance updates are relative
//! deltas, so concurrent requests cannot lose updates or double-spend.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
