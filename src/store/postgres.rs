//! PostgreSQL Transaction Store
//!
//! sqlx-backed implementation of the store ports. A unit of work wraps a
//! `sqlx::Transaction`; dropping it uncommitted rolls back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::domain::{
    Account, AmountCents, NewTransaction, Transaction, TransactionStatus, TransactionType,
};

use super::{StoreError, StoreResult, TransactionStore, UnitOfWork};

const TRANSACTION_COLUMNS: &str = r#"
    id, account_id, card_id, refund_transaction_id, amount_cents,
    status, type, idempotency_key, created_at
"#;

/// Postgres-backed transaction store
#[derive(Debug, Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn find_most_recent(
        &self,
        account_id: Uuid,
        transaction_type: TransactionType,
        amount: AmountCents,
    ) -> StoreResult<Option<Transaction>> {
        let query = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE account_id = $1 AND type = $2 AND amount_cents = $3
            ORDER BY created_at DESC
            LIMIT 1
            "#
        );

        let row: Option<TransactionRow> = sqlx::query_as(&query)
            .bind(account_id)
            .bind(transaction_type.as_str())
            .bind(amount.value())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_by_account(
        &self,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Transaction>> {
        let query = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE account_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows: Vec<TransactionRow> = sqlx::query_as(&query)
            .bind(account_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }
}

/// Unit of work over a single database transaction
pub struct PgUnitOfWork {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn resolve_account(&mut self, account_id: Uuid) -> StoreResult<Option<Account>> {
        let account: Option<(Uuid, String, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, username, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(account.map(|(id, username, created_at, updated_at)| Account {
            id,
            username,
            created_at,
            updated_at,
        }))
    }

    async fn resolve_card_by_token_and_account(
        &mut self,
        card_token: &str,
        account_id: Uuid,
    ) -> StoreResult<Option<Uuid>> {
        let card_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM cards
            WHERE card_token = $1 AND account_id = $2
            "#,
        )
        .bind(card_token)
        .bind(account_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(card_id)
    }

    async fn find_transaction(&mut self, transaction_id: Uuid) -> StoreResult<Option<Transaction>> {
        let query = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1");

        let row: Option<TransactionRow> = sqlx::query_as(&query)
            .bind(transaction_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.map(Transaction::try_from).transpose()
    }

    async fn insert_transaction(&mut self, transaction: &NewTransaction) -> StoreResult<Transaction> {
        let query = format!(
            r#"
            INSERT INTO transactions (
                account_id, card_id, refund_transaction_id, amount_cents,
                status, type, idempotency_key, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );

        let row: TransactionRow = sqlx::query_as(&query)
            .bind(transaction.account_id)
            .bind(transaction.card_id)
            .bind(transaction.refund_transaction_id)
            .bind(transaction.amount.value())
            .bind(transaction.status.as_str())
            .bind(transaction.transaction_type.as_str())
            .bind(transaction.idempotency_key.as_str())
            .bind(transaction.created_at)
            .fetch_one(&mut *self.tx)
            .await?;

        Transaction::try_from(row)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// Internal row type for sqlx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    account_id: Uuid,
    card_id: Option<Uuid>,
    refund_transaction_id: Option<Uuid>,
    amount_cents: i64,
    status: String,
    #[sqlx(rename = "type")]
    transaction_type: String,
    idempotency_key: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let status: TransactionStatus = row.status.parse().map_err(StoreError::InvalidRow)?;
        let transaction_type: TransactionType = row
            .transaction_type
            .parse()
            .map_err(|e: crate::domain::DomainError| StoreError::InvalidRow(e.to_string()))?;

        Ok(Transaction {
            id: row.id,
            account_id: row.account_id,
            card_id: row.card_id,
            refund_transaction_id: row.refund_transaction_id,
            amount_cents: row.amount_cents,
            status,
            transaction_type,
            idempotency_key: row.idempotency_key,
            created_at: row.created_at,
        })
    }
}
