//! The subscribe engine.
//!
//! A subscription is a queue binding, a [`Decoder`] for one payload type,
//! and a handler from that payload to an [`AckType`]. [`subscribe`]
//! declares the topology, applies the prefetch bound, and spawns one
//! sequential worker that runs [`consume`] until the delivery stream ends
//! or settling fails.
//!
//! # Per-delivery protocol
//!
//! 1. Decode the body. On failure, nack with requeue and move on; the
//!    handler is not called.
//! 2. Await the handler. Anything it publishes completes before step 3.
//! 3. Map the verdict to a [`Disposition`] and settle the delivery.
//!
//! A failed ack/nack for a handler verdict ends the worker with
//! [`PubSubError::Acknowledge`].
//!
//! # Bounded redelivery
//!
//! Requeues are counted per message id. Once a message has been requeued
//! `max_redeliveries` times, the next requeue verdict dead-letters it
//! instead. Messages without an id are requeued without limit.

use std::collections::HashMap;
use std::future::Future;
use std::pin::pin;

use futures::{Stream, StreamExt as _};
use lapin::options::{BasicConsumeOptions, BasicQosOptions};
use lapin::types::FieldTable;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::ack::{AckType, Disposition};
use crate::codec::{Decoder, decode_binary, decode_json};
use crate::config::SubscriptionConfig;
use crate::connection::BrokerConnection;
use crate::delivery::Delivery;
use crate::error::{AckError, PubSubError};
use crate::supervisor::WorkerReporter;
use crate::topology::{QueueBinding, declare_and_bind};

/// Upper bound on message ids tracked by one worker's redelivery budget.
const MAX_TRACKED_MESSAGES: usize = 4096;

/// Per-worker requeue counter keyed by message id.
#[derive(Debug)]
pub struct RedeliveryBudget {
    max_redeliveries: u32,
    attempts: HashMap<String, u32>,
}

impl RedeliveryBudget {
    /// A budget allowing `max_redeliveries` requeues per message; `0`
    /// disables the cap.
    pub fn new(max_redeliveries: u32) -> Self {
        Self {
            max_redeliveries,
            attempts: HashMap::new(),
        }
    }

    /// Turn a verdict into the disposition actually sent.
    pub fn disposition(&mut self, message_id: Option<&str>, verdict: AckType) -> Disposition {
        let disposition = Disposition::from(verdict);
        let Some(id) = message_id else {
            return disposition;
        };
        if disposition != Disposition::Requeue {
            self.attempts.remove(id);
            return disposition;
        }
        if self.max_redeliveries == 0 {
            return disposition;
        }

        let used = self.attempts.get(id).copied().unwrap_or(0);
        if used >= self.max_redeliveries {
            self.attempts.remove(id);
            warn!(
                message_id = id,
                requeues = used,
                "redelivery limit reached, dead-lettering"
            );
            return Disposition::DeadLetter;
        }

        if !self.attempts.contains_key(id) && self.attempts.len() >= MAX_TRACKED_MESSAGES {
            debug!(
                tracked = self.attempts.len(),
                "redelivery budget full, resetting"
            );
            self.attempts.clear();
        }
        self.attempts.insert(id.to_owned(), used.saturating_add(1));
        disposition
    }
}

/// Send `disposition` for `delivery`.
async fn settle<D: Delivery>(delivery: &D, disposition: Disposition) -> Result<(), AckError> {
    match disposition.requeue() {
        None => delivery.ack().await,
        Some(requeue) => delivery.nack(requeue).await,
    }
}

/// Run the per-delivery protocol over `deliveries` until the stream ends.
///
/// Deliveries are processed strictly one at a time, in stream order.
///
/// # Errors
///
/// - [`PubSubError::Transport`] (or whatever the stream yields) if the
///   delivery stream fails.
/// - [`PubSubError::Acknowledge`] if settling a handler verdict fails.
pub async fn consume<S, D, T, H, Fut>(
    queue: &str,
    deliveries: S,
    decode: Decoder<T>,
    mut handler: H,
    max_redeliveries: u32,
) -> Result<(), PubSubError>
where
    S: Stream<Item = Result<D, PubSubError>> + Send,
    D: Delivery,
    T: Send,
    H: FnMut(T) -> Fut + Send,
    Fut: Future<Output = AckType> + Send,
{
    let mut deliveries = pin!(deliveries);
    let mut budget = RedeliveryBudget::new(max_redeliveries);

    while let Some(next) = deliveries.next().await {
        let delivery = next?;

        let payload = match decode(delivery.body()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(queue, error = %e, "failed to decode delivery, requeueing");
                let disposition = budget.disposition(delivery.message_id(), AckType::NackRequeue);
                if let Err(e) = settle(&delivery, disposition).await {
                    warn!(queue, error = %e, "failed to nack undecodable delivery");
                }
                continue;
            }
        };

        let verdict = handler(payload).await;
        let disposition = budget.disposition(delivery.message_id(), verdict);
        debug!(queue, ?verdict, ?disposition, "settling delivery");

        if let Err(source) = settle(&delivery, disposition).await {
            error!(queue, ?verdict, error = %source, "failed to settle delivery");
            return Err(PubSubError::Acknowledge {
                queue: queue.to_owned(),
                source,
            });
        }
    }

    Ok(())
}

/// Subscribe `handler` to the queue described by `binding`.
///
/// Returns once the topology is declared and the consumer is registered;
/// deliveries are then processed on a spawned worker that reports its
/// exit through `reporter`.
///
/// # Errors
///
/// - [`PubSubError::Connection`] / [`PubSubError::Declaration`] from
///   [`declare_and_bind`].
/// - [`PubSubError::Transport`] if prefetch or consume setup is rejected.
pub async fn subscribe<T, H, Fut>(
    connection: &BrokerConnection,
    binding: &QueueBinding,
    options: SubscriptionConfig,
    decode: Decoder<T>,
    handler: H,
    reporter: &WorkerReporter,
) -> Result<(), PubSubError>
where
    T: Send + 'static,
    H: FnMut(T) -> Fut + Send + 'static,
    Fut: Future<Output = AckType> + Send + 'static,
{
    let (channel, queue) = declare_and_bind(connection, binding).await?;
    let queue_name = queue.name().as_str().to_owned();

    channel
        .basic_qos(options.prefetch, BasicQosOptions::default())
        .await
        .map_err(|e| {
            PubSubError::Transport(format!("failed to set prefetch on {queue_name}: {e}"))
        })?;

    let consumer = channel
        .basic_consume(
            &queue_name,
            "",
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(|e| PubSubError::Transport(format!("failed to consume {queue_name}: {e}")))?;

    info!(
        queue = queue_name,
        exchange = binding.exchange,
        routing_key = binding.routing_key,
        prefetch = options.prefetch,
        "subscribed"
    );

    let reporter = reporter.clone();
    tokio::spawn(async move {
        let deliveries = consumer.map(|next| {
            next.map_err(|e| PubSubError::Transport(format!("delivery stream failed: {e}")))
        });
        let result = consume(
            &queue_name,
            deliveries,
            decode,
            handler,
            options.max_redeliveries,
        )
        .await;
        if let Err(e) = channel.close(200, "subscription ended").await {
            debug!(queue = queue_name, error = %e, "channel close failed");
        }
        reporter.report(queue_name, result);
    });

    Ok(())
}

/// [`subscribe`] for a structured-text payload.
pub async fn subscribe_json<T, H, Fut>(
    connection: &BrokerConnection,
    binding: &QueueBinding,
    options: SubscriptionConfig,
    handler: H,
    reporter: &WorkerReporter,
) -> Result<(), PubSubError>
where
    T: DeserializeOwned + Send + 'static,
    H: FnMut(T) -> Fut + Send + 'static,
    Fut: Future<Output = AckType> + Send + 'static,
{
    subscribe(
        connection,
        binding,
        options,
        decode_json::<T>,
        handler,
        reporter,
    )
    .await
}

/// [`subscribe`] for a binary payload.
pub async fn subscribe_binary<T, H, Fut>(
    connection: &BrokerConnection,
    binding: &QueueBinding,
    options: SubscriptionConfig,
    handler: H,
    reporter: &WorkerReporter,
) -> Result<(), PubSubError>
where
    T: DeserializeOwned + Send + 'static,
    H: FnMut(T) -> Fut + Send + 'static,
    Fut: Future<Output = AckType> + Send + 'static,
{
    subscribe(
        connection,
        binding,
        options,
        decode_binary::<T>,
        handler,
        reporter,
    )
    .await
}
