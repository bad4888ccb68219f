//! Common test utilities
//!
//! In-memory stand-ins for the store, broker and cache, plus a Postgres
//! setup helper for the tests that need a real database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use uuid::Uuid;

use payment_gateway::cache::{BalanceCache, CacheError};
use payment_gateway::domain::{Account, AmountCents, Card, NewTransaction, Transaction, TransactionStatus, TransactionType};
use payment_gateway::messaging::{MessagePublisher, PublishError};
use payment_gateway::store::{StoreError, StoreResult, TransactionStore, UnitOfWork};
use payment_gateway::{api, AppState};

// =========================================================================
// In-memory transaction store
// =========================================================================

#[derive(Default)]
struct StoreState {
    accounts: HashMap<Uuid, Account>,
    cards: Vec<Card>,
    transactions: Vec<Transaction>,
    commits: usize,
    rollbacks: usize,
    fail_commit: bool,
}

/// Store whose units of work stage inserts until commit
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, username: &str) -> Uuid {
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            created_at: now,
            updated_at: now,
        };
        let id = account.id;
        self.state.lock().unwrap().accounts.insert(id, account);
        id
    }

    pub fn add_card(&self, account_id: Uuid, card_token: &str) -> Uuid {
        let card = Card {
            id: Uuid::new_v4(),
            account_id,
            card_token: card_token.to_string(),
            last_four_digits: "4242".to_string(),
            created_at: Utc::now(),
        };
        let id = card.id;
        self.state.lock().unwrap().cards.push(card);
        id
    }

    /// Insert an already-committed row with an arbitrary timestamp
    pub fn seed_transaction(
        &self,
        account_id: Uuid,
        transaction_type: TransactionType,
        amount_cents: i64,
        created_at: DateTime<Utc>,
    ) -> Transaction {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            account_id,
            card_id: None,
            refund_transaction_id: None,
            amount_cents,
            status: TransactionStatus::Pending,
            transaction_type,
            idempotency_key: format!("seeded:{}", Uuid::new_v4()),
            created_at,
        };
        self.state
            .lock()
            .unwrap()
            .transactions
            .push(transaction.clone());
        transaction
    }

    pub fn fail_commits(&self) {
        self.state.lock().unwrap().fail_commit = true;
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().transactions.clone()
    }

    pub fn transaction_count(&self) -> usize {
        self.state.lock().unwrap().transactions.len()
    }

    pub fn commits(&self) -> usize {
        self.state.lock().unwrap().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.state.lock().unwrap().rollbacks
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork {
            state: self.state.clone(),
            staged: Vec::new(),
        }))
    }

    async fn find_most_recent(
        &self,
        account_id: Uuid,
        transaction_type: TransactionType,
        amount: AmountCents,
    ) -> StoreResult<Option<Transaction>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .transactions
            .iter()
            .filter(|t| {
                t.account_id == account_id
                    && t.transaction_type == transaction_type
                    && t.amount_cents == amount.value()
            })
            .max_by_key(|t| t.created_at)
            .cloned())
    }

    async fn find_by_account(
        &self,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Transaction>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| t.account_id == account_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

pub struct InMemoryUnitOfWork {
    state: Arc<Mutex<StoreState>>,
    staged: Vec<Transaction>,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn resolve_account(&mut self, account_id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.state.lock().unwrap().accounts.get(&account_id).cloned())
    }

    async fn resolve_card_by_token_and_account(
        &mut self,
        card_token: &str,
        account_id: Uuid,
    ) -> StoreResult<Option<Uuid>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .cards
            .iter()
            .find(|c| c.card_token == card_token && c.account_id == account_id)
            .map(|c| c.id))
    }

    async fn find_transaction(&mut self, transaction_id: Uuid) -> StoreResult<Option<Transaction>> {
        if let Some(staged) = self.staged.iter().find(|t| t.id == transaction_id) {
            return Ok(Some(staged.clone()));
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .transactions
            .iter()
            .find(|t| t.id == transaction_id)
            .cloned())
    }

    async fn insert_transaction(&mut self, transaction: &NewTransaction) -> StoreResult<Transaction> {
        let row = Transaction {
            id: Uuid::new_v4(),
            account_id: transaction.account_id,
            card_id: transaction.card_id,
            refund_transaction_id: transaction.refund_transaction_id,
            amount_cents: transaction.amount.value(),
            status: transaction.status,
            transaction_type: transaction.transaction_type,
            idempotency_key: transaction.idempotency_key.as_str().to_string(),
            created_at: transaction.created_at,
        };
        self.staged.push(row.clone());
        Ok(row)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let this = *self;
        let mut state = this.state.lock().unwrap();
        if state.fail_commit {
            state.rollbacks += 1;
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        state.commits += 1;
        state.transactions.extend(this.staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.state.lock().unwrap().rollbacks += 1;
        Ok(())
    }
}

// =========================================================================
// Recording publisher
// =========================================================================

#[derive(Clone, Default)]
pub struct RecordingPublisher {
    messages: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_publishes(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// Decoded payloads published to `queue`, in order
    pub fn messages_on(&self, queue: &str) -> Vec<serde_json::Value> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(q, _)| q == queue)
            .map(|(_, payload)| serde_json::from_slice(payload).unwrap())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl MessagePublisher for RecordingPublisher {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), PublishError> {
        if *self.fail.lock().unwrap() {
            return Err(PublishError::Unavailable("broker down".to_string()));
        }
        self.messages
            .lock()
            .unwrap()
            .push((queue.to_string(), payload.to_vec()));
        Ok(())
    }
}

// =========================================================================
// In-memory balance cache
// =========================================================================

#[derive(Clone, Default)]
pub struct InMemoryCache {
    balances: Arc<Mutex<HashMap<Uuid, i64>>>,
    fail: Arc<Mutex<bool>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, account_id: Uuid, balance_cents: i64) {
        self.balances.lock().unwrap().insert(account_id, balance_cents);
    }

    pub fn fail_reads(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl BalanceCache for InMemoryCache {
    async fn get_balance(&self, account_id: Uuid) -> Result<Option<i64>, CacheError> {
        if *self.fail.lock().unwrap() {
            return Err(CacheError::Backend(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection reset",
            ))));
        }
        Ok(self.balances.lock().unwrap().get(&account_id).copied())
    }
}

// =========================================================================
// Wiring
// =========================================================================

/// Fakes behind a ready-to-serve application
pub struct TestApp {
    pub store: InMemoryStore,
    pub publisher: RecordingPublisher,
    pub cache: InMemoryCache,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new(),
            publisher: RecordingPublisher::new(),
            cache: InMemoryCache::new(),
        }
    }

    pub fn state(&self) -> AppState {
        AppState::new(
            Arc::new(self.store.clone()),
            Arc::new(self.publisher.clone()),
            Arc::new(self.cache.clone()),
        )
    }

    pub fn router(&self) -> Router {
        api::build_app(self.state(), Duration::from_secs(5))
    }
}

/// A card token long enough to pass validation
pub fn card_token() -> String {
    format!("tok_{}", Uuid::new_v4().simple())
}

// =========================================================================
// Postgres
// =========================================================================

/// Connect to `DATABASE_URL`, apply the schema and truncate the tables
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    pool.execute(include_str!("../../migrations/0001_create_payment_tables.sql"))
        .await
        .expect("Failed to apply schema");

    sqlx::query("TRUNCATE TABLE transactions, cards, accounts CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}

/// Insert an account and return its id
pub async fn seed_account(pool: &PgPool, username: &str) -> Uuid {
    sqlx::query_scalar("INSERT INTO accounts (username) VALUES ($1) RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .expect("Failed to seed account")
}

/// Insert a card for `account_id` and return its id
pub async fn seed_card(pool: &PgPool, account_id: Uuid, card_token: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO cards (account_id, card_token, last_four_digits) VALUES ($1, $2, '4242') RETURNING id",
    )
    .bind(account_id)
    .bind(card_token)
    .fetch_one(pool)
    .await
    .expect("Failed to seed card")
}
