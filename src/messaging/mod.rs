//! Messaging module
//!
//! Producer side of the broker boundary. Delivery is at-least-once and
//! fire-and-forget: publishing never waits for a consumer.

mod amqp;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use amqp::AmqpPublisher;

/// Queue receiving every admitted transaction row
pub const TRANSACTIONS_QUEUE: &str = "transactions_queue";

/// Queue receiving balance recomputation requests
pub const CALCULATE_BALANCE_QUEUE: &str = "calculate_balance_queue";

/// Queues declared at startup
pub const DECLARED_QUEUES: &[&str] = &[TRANSACTIONS_QUEUE, CALCULATE_BALANCE_QUEUE];

/// Errors raised while handing a message to the broker
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Broker unavailable: {0}")]
    Unavailable(String),
}

/// Dispatches payloads to named queues
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), PublishError>;
}

/// Payload of a `calculate_balance` message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRequest {
    pub account_id: Uuid,
}

/// Serialize `message` as JSON and publish it to `queue`
pub async fn publish_json<T: Serialize + Sync>(
    publisher: &dyn MessagePublisher,
    queue: &str,
    message: &T,
) -> Result<(), PublishError> {
    let payload = serde_json::to_vec(message)?;
    publisher.publish(queue, &payload).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_request_payload() {
        let account_id: Uuid = "e7b40123-cb12-41fa-b5bc-5a128448027e".parse().unwrap();
        let payload = serde_json::to_string(&BalanceRequest { account_id }).unwrap();
        assert_eq!(payload, r#"{"account_id":"e7b40123-cb12-41fa-b5bc-5a128448027e"}"#);
    }

    #[test]
    fn test_declared_queues() {
        assert!(DECLARED_QUEUES.contains(&TRANSACTIONS_QUEUE));
        assert!(DECLARED_QUEUES.contains(&CALCULATE_BALANCE_QUEUE));
    }
}
