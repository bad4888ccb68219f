//! Transaction Store ports
//!
//! The relational store behind the admission engine. Lookups used for
//! cross-entity validation run inside the same unit of work as the insert.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, AmountCents, NewTransaction, Transaction, TransactionType};

use super::StoreResult;

/// An open atomic unit of work.
///
/// Dropping it without calling `commit` discards every write.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Resolve an account by id
    async fn resolve_account(&mut self, account_id: Uuid) -> StoreResult<Option<Account>>;

    /// Resolve a card token to a card id, scoped to the owning account
    async fn resolve_card_by_token_and_account(
        &mut self,
        card_token: &str,
        account_id: Uuid,
    ) -> StoreResult<Option<Uuid>>;

    /// Point lookup of a transaction
    async fn find_transaction(&mut self, transaction_id: Uuid) -> StoreResult<Option<Transaction>>;

    /// Insert a row, returning it with its generated identity
    async fn insert_transaction(&mut self, transaction: &NewTransaction) -> StoreResult<Transaction>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Long-lived handle to the transaction store
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Open a new unit of work
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;

    /// Most recent transaction matching (account, type, amount), any key
    async fn find_most_recent(
        &self,
        account_id: Uuid,
        transaction_type: TransactionType,
        amount: AmountCents,
    ) -> StoreResult<Option<Transaction>>;

    /// Range query: an account's transactions, newest first
    async fn find_by_account(
        &self,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Transaction>>;
}
