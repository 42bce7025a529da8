//! HTTP middleware components.
//!
//! Layering order matters: idempotency must wrap chaos so that injected
//! failures are never cached and a retried key performs the real work.

pub mod chaos;
pub mod idempotency;
