//! In-memory transport for tests.
//!
//! [`RecordingPublisher`] records every send and can be switched into a
//! failing mode. [`MemoryQueue`] behaves like a single broker queue: nacks
//! with requeue put the message back at the tail, nacks without requeue
//! move it to a dead-letter list.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::Stream;
use serde::de::DeserializeOwned;

use crate::codec::Encoding;
use crate::delivery::Delivery;
use crate::error::{AckError, CodecError, PubSubError};
use crate::publish::{OutgoingMessage, Publisher};

/// One recorded send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    /// Target exchange.
    pub exchange: String,
    /// Routing key.
    pub routing_key: String,
    /// The encoded message.
    pub message: OutgoingMessage,
}

impl Published {
    /// Decode the recorded body.
    pub fn decode<T: DeserializeOwned>(&self, encoding: Encoding) -> Result<T, CodecError> {
        encoding.decode(&self.message.body)
    }
}

/// A [`Publisher`] that records instead of sending.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    sent: Mutex<Vec<Published>>,
    failing: AtomicBool,
}

impl RecordingPublisher {
    /// A publisher whose sends succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    /// Everything sent so far, oldest first.
    pub fn published(&self) -> Vec<Published> {
        lock(&self.sent).clone()
    }
}

impl Publisher for RecordingPublisher {
    async fn send(
        &self,
        exchange: &str,
        routing_key: &str,
        message: OutgoingMessage,
    ) -> Result<(), PubSubError> {
        if self.failing.load(Ordering::Acquire) {
            return Err(PubSubError::Transport(format!(
                "publish to {exchange} with key {routing_key} refused"
            )));
        }
        lock(&self.sent).push(Published {
            exchange: exchange.to_owned(),
            routing_key: routing_key.to_owned(),
            message,
        });
        Ok(())
    }
}

/// A message held by a [`MemoryQueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    /// Raw body.
    pub body: Vec<u8>,
    /// Publisher-assigned id.
    pub message_id: Option<String>,
}

#[derive(Debug, Default)]
struct QueueState {
    ready: VecDeque<StoredMessage>,
    acked: Vec<StoredMessage>,
    dead_lettered: Vec<StoredMessage>,
    deliveries: usize,
    fail_acks: bool,
}

/// A single in-memory queue.
#[derive(Debug, Clone, Default)]
pub struct MemoryQueue {
    state: Arc<Mutex<QueueState>>,
}

impl MemoryQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a raw body.
    pub fn push(&self, body: Vec<u8>, message_id: Option<&str>) {
        lock(&self.state).ready.push_back(StoredMessage {
            body,
            message_id: message_id.map(str::to_owned),
        });
    }

    /// Enqueue a message as a publisher would have sent it.
    pub fn push_message(&self, message: OutgoingMessage) {
        self.push(message.body, Some(&message.message_id));
    }

    /// Make every subsequent ack and nack fail.
    pub fn fail_acks(&self) {
        lock(&self.state).fail_acks = true;
    }

    /// Messages positively acknowledged so far.
    pub fn acked(&self) -> Vec<StoredMessage> {
        lock(&self.state).acked.clone()
    }

    /// Messages nacked without requeue.
    pub fn dead_lettered(&self) -> Vec<StoredMessage> {
        lock(&self.state).dead_lettered.clone()
    }

    /// Messages waiting for delivery.
    pub fn ready_len(&self) -> usize {
        lock(&self.state).ready.len()
    }

    /// Total deliveries handed out, redeliveries included.
    pub fn delivery_count(&self) -> usize {
        lock(&self.state).deliveries
    }

    /// A delivery stream that ends when the queue is empty or after
    /// `limit` deliveries, whichever comes first.
    pub fn deliveries(
        &self,
        limit: usize,
    ) -> impl Stream<Item = Result<MemoryDelivery, PubSubError>> + Send + use<> {
        futures::stream::unfold(Arc::clone(&self.state), move |state| async move {
            let message = {
                let mut guard = lock(&state);
                if guard.deliveries >= limit {
                    return None;
                }
                let message = guard.ready.pop_front()?;
                guard.deliveries = guard.deliveries.saturating_add(1);
                message
            };
            let delivery = MemoryDelivery {
                message,
                state: Arc::clone(&state),
            };
            Some((Ok(delivery), state))
        })
    }
}

/// A delivery handed out by a [`MemoryQueue`].
#[derive(Debug)]
pub struct MemoryDelivery {
    message: StoredMessage,
    state: Arc<Mutex<QueueState>>,
}

impl MemoryDelivery {
    fn settle(&self, apply: impl FnOnce(&mut QueueState, StoredMessage)) -> Result<(), AckError> {
        let mut guard = lock(&self.state);
        if guard.fail_acks {
            return Err(AckError::ChannelClosed);
        }
        apply(&mut guard, self.message.clone());
        Ok(())
    }
}

impl Delivery for MemoryDelivery {
    fn body(&self) -> &[u8] {
        &self.message.body
    }

    fn message_id(&self) -> Option<&str> {
        self.message.message_id.as_deref()
    }

    async fn ack(&self) -> Result<(), AckError> {
        self.settle(|state, message| state.acked.push(message))
    }

    async fn nack(&self, requeue: bool) -> Result<(), AckError> {
        self.settle(|state, message| {
            if requeue {
                state.ready.push_back(message);
            } else {
                state.dead_lettered.push(message);
            }
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
