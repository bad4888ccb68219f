//! Command Handlers module
//!
//! Handlers that orchestrate the store, the broker and the cache for each
//! API operation.

mod admission_handler;
mod balance_handler;
mod commands;

pub use admission_handler::TransactionAdmissionHandler;
pub use balance_handler::{BalanceRetrievalHandler, BalanceStatus};
pub use commands::*;
