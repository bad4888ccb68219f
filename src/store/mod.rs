//! Transaction Store module
//!
//! Persistence layer for transaction rows.
//! Handles atomic units of work and dedup lookups against PostgreSQL.

mod error;
mod postgres;
mod repository;

pub use error::{StoreError, StoreResult};
pub use postgres::PgTransactionStore;
pub use repository::{TransactionStore, UnitOfWork};
