//! Balance Retrieval Handler
//!
//! Cache-aside read of an account balance. A miss publishes a recompute
//! request and returns immediately; the caller polls again later.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::BalanceCache;
use crate::domain::RequestContext;
use crate::error::AppError;
use crate::messaging::{publish_json, BalanceRequest, MessagePublisher, CALCULATE_BALANCE_QUEUE};

/// Outcome of a balance query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BalanceStatus {
    Ready { balance_cents: i64 },
    Processing,
}

/// Handler for balance queries
pub struct BalanceRetrievalHandler {
    cache: Arc<dyn BalanceCache>,
    publisher: Arc<dyn MessagePublisher>,
}

impl BalanceRetrievalHandler {
    pub fn new(cache: Arc<dyn BalanceCache>, publisher: Arc<dyn MessagePublisher>) -> Self {
        Self { cache, publisher }
    }

    pub async fn execute(
        &self,
        account_id: Uuid,
        context: &RequestContext,
    ) -> Result<BalanceStatus, AppError> {
        if let Some(balance_cents) = self.cache.get_balance(account_id).await? {
            tracing::debug!(
                correlation_id = %context.correlation_id,
                account_id = %account_id,
                "Balance cache hit"
            );
            return Ok(BalanceStatus::Ready { balance_cents });
        }

        publish_json(
            self.publisher.as_ref(),
            CALCULATE_BALANCE_QUEUE,
            &BalanceRequest { account_id },
        )
        .await?;

        tracing::info!(
            correlation_id = %context.correlation_id,
            account_id = %account_id,
            "Balance cache miss, recomputation requested"
        );

        Ok(BalanceStatus::Processing)
    }
}
