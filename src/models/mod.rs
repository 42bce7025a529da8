//! Data models shared by the stores, services, and HTTP layer.

pub mod account;
pub mod transaction;

pub use account::Account;
pub use transaction::{
    IdempotencyRecord, NewTransaction, Transaction, TransactionStatus, TransactionType,
};
