//! Result Cache module
//!
//! Read side of the precomputed balance cache. Entries are written by the
//! external recompute worker; absence is an expected state, distinct from
//! a backend failure.

mod redis_cache;

use async_trait::async_trait;
use uuid::Uuid;

pub use redis_cache::RedisBalanceCache;

/// Cache errors other than a missing key
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("Malformed cached balance for {key}: {value}")]
    Malformed { key: String, value: String },
}

/// Cache key holding an account's balance
pub fn balance_key(account_id: Uuid) -> String {
    format!("balance:{}", account_id)
}

/// Parse a string-encoded integer balance
pub fn parse_balance(key: &str, value: &str) -> Result<i64, CacheError> {
    value.trim().parse().map_err(|_| CacheError::Malformed {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[async_trait]
pub trait BalanceCache: Send + Sync {
    /// Cached balance in cents, `None` on a miss
    async fn get_balance(&self, account_id: Uuid) -> Result<Option<i64>, CacheError>;
}
