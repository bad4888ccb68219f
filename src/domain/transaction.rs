//! Transaction domain types
//!
//! The transaction row as this core sees it. Rows are append-only here:
//! status transitions away from `PENDING` belong to the external
//! balance-recompute worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{AmountCents, DomainError, IdempotencyKey};

/// Kind of money movement. Direction is implied by the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Purchase,
    Refund,
    Charge,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Purchase => "PURCHASE",
            TransactionType::Refund => "REFUND",
            TransactionType::Charge => "CHARGE",
        }
    }

    /// Types that must be backed by one of the account's cards
    pub fn is_card_backed(&self) -> bool {
        matches!(self, TransactionType::Purchase | TransactionType::Charge)
    }

    pub fn is_refund(&self) -> bool {
        matches!(self, TransactionType::Refund)
    }
}

impl FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(TransactionType::Deposit),
            "PURCHASE" => Ok(TransactionType::Purchase),
            "REFUND" => Ok(TransactionType::Refund),
            "CHARGE" => Ok(TransactionType::Charge),
            other => Err(DomainError::InvalidTransactionType(other.to_string())),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing status. This core only ever writes `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Approved => "APPROVED",
            TransactionStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TransactionStatus::Pending),
            "APPROVED" => Ok(TransactionStatus::Approved),
            "REJECTED" => Ok(TransactionStatus::Rejected),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted transaction row.
///
/// This is also the payload published to the transactions queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub card_id: Option<Uuid>,
    pub refund_transaction_id: Option<Uuid>,
    pub amount_cents: i64,
    pub status: TransactionStatus,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub idempotency_key: String,
    pub created_at: DateTime<Utc>,
}

/// A transaction row about to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub card_id: Option<Uuid>,
    pub refund_transaction_id: Option<Uuid>,
    pub amount: AmountCents,
    pub status: TransactionStatus,
    pub transaction_type: TransactionType,
    pub idempotency_key: IdempotencyKey,
    pub created_at: DateTime<Utc>,
}

impl NewTransaction {
    /// Build a `PENDING` row whose timestamp matches its idempotency key.
    pub fn pending(
        account_id: Uuid,
        transaction_type: TransactionType,
        amount: AmountCents,
        idempotency_key: IdempotencyKey,
    ) -> Self {
        Self {
            account_id,
            card_id: None,
            refund_transaction_id: None,
            amount,
            status: TransactionStatus::Pending,
            transaction_type,
            created_at: idempotency_key.issued_at(),
            idempotency_key,
        }
    }

    pub fn with_card(mut self, card_id: Uuid) -> Self {
        self.card_id = Some(card_id);
        self
    }

    pub fn with_refund_of(mut self, original_id: Uuid) -> Self {
        self.refund_transaction_id = Some(original_id);
        self
    }
}
