//! Fire-and-forget publishing.
//!
//! [`publish`] encodes a value and hands it to a [`Publisher`]. No broker
//! confirmation is awaited; a caller that needs end-to-end confirmation
//! must infer it from downstream effects.

use std::future::Future;

use lapin::options::BasicPublishOptions;
use lapin::{BasicProperties, Channel};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::codec::Encoding;
use crate::connection::BrokerConnection;
use crate::error::PubSubError;

/// An encoded message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Encoded payload.
    pub body: Vec<u8>,
    /// `content-type` property matching the encoding.
    pub content_type: &'static str,
    /// Unique id; subscribers use it to bound redelivery.
    pub message_id: String,
}

/// Something that can put an encoded message on an exchange.
pub trait Publisher: Send + Sync {
    /// Send `message` to `exchange` under `routing_key`.
    ///
    /// # Errors
    ///
    /// Returns [`PubSubError::Transport`] if the transport rejects the send.
    fn send(
        &self,
        exchange: &str,
        routing_key: &str,
        message: OutgoingMessage,
    ) -> impl Future<Output = Result<(), PubSubError>> + Send;
}

/// Encode `value` and publish it.
///
/// # Errors
///
/// - [`PubSubError::Serialization`] if encoding fails; nothing is sent.
/// - [`PubSubError::Transport`] if the send fails.
pub async fn publish<P, T>(
    publisher: &P,
    exchange: &str,
    routing_key: &str,
    encoding: Encoding,
    value: &T,
) -> Result<(), PubSubError>
where
    P: Publisher,
    T: Serialize + Sync,
{
    let body = encoding.encode(value)?;
    let message = OutgoingMessage {
        body,
        content_type: encoding.content_type(),
        message_id: Uuid::new_v4().to_string(),
    };
    debug!(
        exchange,
        routing_key,
        message_id = message.message_id,
        bytes = message.body.len(),
        "publishing"
    );
    publisher.send(exchange, routing_key, message).await
}

/// [`publish`] with [`Encoding::Json`].
pub async fn publish_json<P, T>(
    publisher: &P,
    exchange: &str,
    routing_key: &str,
    value: &T,
) -> Result<(), PubSubError>
where
    P: Publisher,
    T: Serialize + Sync,
{
    publish(publisher, exchange, routing_key, Encoding::Json, value).await
}

/// [`publish`] with [`Encoding::Binary`].
pub async fn publish_binary<P, T>(
    publisher: &P,
    exchange: &str,
    routing_key: &str,
    value: &T,
) -> Result<(), PubSubError>
where
    P: Publisher,
    T: Serialize + Sync,
{
    publish(publisher, exchange, routing_key, Encoding::Binary, value).await
}

/// A publisher that owns one AMQP channel.
pub struct AmqpPublisher {
    channel: Channel,
}

impl AmqpPublisher {
    /// Open a dedicated publishing channel on `connection`.
    pub async fn open(connection: &BrokerConnection) -> Result<Self, PubSubError> {
        let channel = connection.open_channel().await?;
        Ok(Self { channel })
    }
}

impl Publisher for AmqpPublisher {
    async fn send(
        &self,
        exchange: &str,
        routing_key: &str,
        message: OutgoingMessage,
    ) -> Result<(), PubSubError> {
        let properties = BasicProperties::default()
            .with_content_type(message.content_type.into())
            .with_message_id(message.message_id.as_str().into());

        // The returned confirm is dropped: publishing is fire-and-forget.
        self.channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                &message.body,
                properties,
            )
            .await
            .map_err(|e| {
                PubSubError::Transport(format!(
                    "failed to publish to {exchange} with key {routing_key}: {e}"
                ))
            })?;
        Ok(())
    }
}

impl std::fmt::Debug for AmqpPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmqpPublisher")
            .field("channel_id", &self.channel.id())
            .finish()
    }
}
