//! AMQP Publisher
//!
//! RabbitMQ producer over a long-lived connection. The channel is reopened
//! from the connection when a channel-level error has closed it.

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tokio::sync::Mutex;

use super::{MessagePublisher, PublishError, DECLARED_QUEUES};

/// Persistent delivery mode
const DELIVERY_MODE_PERSISTENT: u8 = 2;

/// What to do with the cached channel before a publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelAction {
    Reuse,
    Reopen,
    Unavailable,
}

/// A channel closed by a channel-level exception is replaced as long as the
/// connection itself is still up.
fn channel_action(connection_connected: bool, channel_connected: bool) -> ChannelAction {
    match (connection_connected, channel_connected) {
        (false, _) => ChannelAction::Unavailable,
        (true, true) => ChannelAction::Reuse,
        (true, false) => ChannelAction::Reopen,
    }
}

pub struct AmqpPublisher {
    connection: Connection,
    channel: Mutex<Channel>,
}

impl AmqpPublisher {
    /// Connect to the broker and declare the durable queues
    pub async fn connect(amqp_uri: &str) -> Result<Self, PublishError> {
        let connection = Connection::connect(amqp_uri, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        for queue in DECLARED_QUEUES {
            channel
                .queue_declare(
                    queue,
                    QueueDeclareOptions {
                        durable: true,
                        ..Default::default()
                    },
                    FieldTable::default(),
                )
                .await?;
            tracing::debug!(queue = %queue, "Declared durable queue");
        }

        Ok(Self {
            connection,
            channel: Mutex::new(channel),
        })
    }

    /// A connected channel, reopened from the connection if it was closed
    async fn ready_channel(&self) -> Result<Channel, PublishError> {
        let mut channel = self.channel.lock().await;

        match channel_action(
            self.connection.status().connected(),
            channel.status().connected(),
        ) {
            ChannelAction::Reuse => {}
            ChannelAction::Reopen => {
                tracing::warn!(channel_id = channel.id(), "AMQP channel closed, reopening");
                *channel = self.connection.create_channel().await?;
            }
            ChannelAction::Unavailable => {
                return Err(PublishError::Unavailable(
                    "AMQP connection is not connected".to_string(),
                ));
            }
        }

        Ok(channel.clone())
    }

    /// Close the connection at shutdown
    pub async fn close(&self) -> Result<(), PublishError> {
        self.connection.close(200, "shutdown").await?;
        Ok(())
    }
}

#[async_trait]
impl MessagePublisher for AmqpPublisher {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), PublishError> {
        let channel = self.ready_channel().await?;

        channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default()
                    .with_content_type("application/json".into())
                    .with_delivery_mode(DELIVERY_MODE_PERSISTENT),
            )
            .await?
            .await?;

        tracing::debug!(queue = %queue, bytes = payload.len(), "Published message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_action() {
        assert_eq!(channel_action(true, true), ChannelAction::Reuse);
        assert_eq!(channel_action(true, false), ChannelAction::Reopen);
        assert_eq!(channel_action(false, true), ChannelAction::Unavailable);
        assert_eq!(channel_action(false, false), ChannelAction::Unavailable);
    }
}
