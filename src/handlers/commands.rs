//! Command definitions
//!
//! Commands represent intentions to change the system state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{CARD_TOKEN_MAX_LEN, CARD_TOKEN_MIN_LEN};
use crate::domain::{AmountCents, DomainError, Transaction, TransactionType};

// =========================================================================
// SubmitTransactionCommand
// =========================================================================

/// Command to admit a new transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTransactionCommand {
    pub account_id: Uuid,
    /// Card token, required for card-backed types
    pub card_token: Option<String>,
    /// Original transaction, required for REFUND
    pub refund_transaction_id: Option<Uuid>,
    /// Amount in cents (validated as strictly positive)
    pub amount_cents: i64,
    /// Transaction type name as submitted
    pub transaction_type: String,
}

impl SubmitTransactionCommand {
    pub fn new(account_id: Uuid, amount_cents: i64, transaction_type: impl Into<String>) -> Self {
        Self {
            account_id,
            card_token: None,
            refund_transaction_id: None,
            amount_cents,
            transaction_type: transaction_type.into(),
        }
    }

    pub fn with_card_token(mut self, card_token: impl Into<String>) -> Self {
        self.card_token = Some(card_token.into());
        self
    }

    pub fn with_refund_of(mut self, transaction_id: Uuid) -> Self {
        self.refund_transaction_id = Some(transaction_id);
        self
    }

    /// Check field-level constraints without any I/O.
    ///
    /// A card token on a non-card type and a refund reference on a non-refund
    /// type are dropped, not rejected.
    pub fn validate(self) -> Result<ValidatedSubmission, DomainError> {
        let transaction_type: TransactionType = self.transaction_type.parse()?;
        let amount = AmountCents::new(self.amount_cents)?;

        let card_token = if transaction_type.is_card_backed() {
            let token = self
                .card_token
                .ok_or(DomainError::MissingCardToken(transaction_type))?;
            let len = token.chars().count();
            if !(CARD_TOKEN_MIN_LEN..=CARD_TOKEN_MAX_LEN).contains(&len) {
                return Err(DomainError::InvalidCardToken);
            }
            Some(token)
        } else {
            None
        };

        let refund_transaction_id = if transaction_type.is_refund() {
            Some(
                self.refund_transaction_id
                    .ok_or(DomainError::MissingRefundReference)?,
            )
        } else {
            None
        };

        Ok(ValidatedSubmission {
            account_id: self.account_id,
            card_token,
            refund_transaction_id,
            amount,
            transaction_type,
        })
    }
}

/// A submission that passed field validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub account_id: Uuid,
    pub card_token: Option<String>,
    pub refund_transaction_id: Option<Uuid>,
    pub amount: AmountCents,
    pub transaction_type: TransactionType,
}

/// Result of a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionResult {
    pub transaction: Transaction,
    /// Set when an earlier matching transaction was returned instead
    pub duplicate: bool,
}
