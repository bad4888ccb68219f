//! Domain module
//!
//! Core domain types shared by the admission engine and the balance reader.

pub mod account;
pub mod amount;
pub mod context;
pub mod error;
pub mod idempotency;
pub mod transaction;

pub use account::{Account, Card};
pub use amount::{AmountCents, AmountError};
pub use context::RequestContext;
pub use error::DomainError;
pub use idempotency::{within_dedup_window, IdempotencyKey, DEDUP_WINDOW_SECONDS};
pub use transaction::{NewTransaction, Transaction, TransactionStatus, TransactionType};
