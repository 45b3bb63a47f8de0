//! The consumer-side view of one delivered message.

use std::future::Future;

use lapin::options::{BasicAckOptions, BasicNackOptions};

use crate::error::AckError;

/// A delivered message the engine can decode and settle.
pub trait Delivery: Send + Sync {
    /// Raw message body.
    fn body(&self) -> &[u8];

    /// The publisher-assigned message id, if any.
    fn message_id(&self) -> Option<&str>;

    /// Positive acknowledgment.
    fn ack(&self) -> impl Future<Output = Result<(), AckError>> + Send;

    /// Negative acknowledgment. `requeue = false` dead-letters.
    fn nack(&self, requeue: bool) -> impl Future<Output = Result<(), AckError>> + Send;
}

impl Delivery for lapin::message::Delivery {
    fn body(&self) -> &[u8] {
        &self.data
    }

    fn message_id(&self) -> Option<&str> {
        self.properties.message_id().as_ref().map(|id| id.as_str())
    }

    async fn ack(&self) -> Result<(), AckError> {
        self.acker
            .ack(BasicAckOptions::default())
            .await
            .map_err(|e| AckError::Broker(Box::new(e)))
    }

    async fn nack(&self, requeue: bool) -> Result<(), AckError> {
        self.acker
            .nack(BasicNackOptions {
                multiple: false,
                requeue,
            })
            .await
            .map_err(|e| AckError::Broker(Box::new(e)))
    }
}
