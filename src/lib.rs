//! payment-gateway Library
//!
//! Transaction admission and cache-aside balance retrieval.
//! Re-exports modules for integration testing and the server binary.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod messaging;
pub mod state;
pub mod store;

mod error;

pub use config::Config;
pub use error::{AppError, ErrorResponse};
pub use state::AppState;
pub use domain::{AmountCents, DomainError, RequestContext, Transaction, TransactionStatus, TransactionType};
