//! Redis-backed balance cache

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use uuid::Uuid;

use super::{balance_key, parse_balance, BalanceCache, CacheError};

/// Holds one multiplexed connection, cloned per call
#[derive(Clone)]
pub struct RedisBalanceCache {
    connection: MultiplexedConnection,
}

impl RedisBalanceCache {
    /// Open the client and verify the server answers PING
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let mut connection = client.get_multiplexed_tokio_connection().await?;

        let pong: String = redis::cmd("PING").query_async(&mut connection).await?;
        tracing::debug!(reply = %pong, "Redis connection verified");

        Ok(Self { connection })
    }
}

#[async_trait]
impl BalanceCache for RedisBalanceCache {
    async fn get_balance(&self, account_id: Uuid) -> Result<Option<i64>, CacheError> {
        let key = balance_key(account_id);
        let mut conn = self.connection.clone();

        let value: Option<String> = conn.get(&key).await?;

        value.map(|v| parse_balance(&key, &v)).transpose()
    }
}
