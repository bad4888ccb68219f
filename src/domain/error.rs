//! Domain Error Types
//!
//! Validation failures detected before any I/O. None of these touch the
//! store or the queue.

use thiserror::Error;

use super::{AmountError, TransactionType};

/// Card token length bounds accepted at submission
pub const CARD_TOKEN_MIN_LEN: usize = 20;
pub const CARD_TOKEN_MAX_LEN: usize = 126;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Amount is zero, negative or out of range
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// Type is not one of DEPOSIT, PURCHASE, REFUND, CHARGE
    #[error("Invalid transaction type: {0}")]
    InvalidTransactionType(String),

    /// Card-backed type submitted without a card token
    #[error("card_token is required for {0} transactions")]
    MissingCardToken(TransactionType),

    /// Card token outside the accepted shape
    #[error("card_token must be between {CARD_TOKEN_MIN_LEN} and {CARD_TOKEN_MAX_LEN} characters")]
    InvalidCardToken,

    /// REFUND submitted without the transaction it refunds
    #[error("refund_transaction_id is required for REFUND transactions")]
    MissingRefundReference,
}

impl DomainError {
    /// Machine-readable code used in API error bodies
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "invalid_amount",
            Self::InvalidTransactionType(_) => "invalid_transaction_type",
            Self::MissingCardToken(_) => "missing_card_token",
            Self::InvalidCardToken => "invalid_card_token",
            Self::MissingRefundReference => "missing_refund_reference",
        }
    }
}
