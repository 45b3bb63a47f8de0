//! Game log aggregation.
//!
//! All clients publish their logs under `game_logs.<username>`. The
//! coordinator drains them from one durable queue, so logs written while
//! it is down are kept by the broker.

use std::future;

use peril_pubsub::{
    AckType, BrokerConnection, PubSubError, QueueBinding, QueueDurability, SubscriptionConfig,
    WorkerReporter, subscribe_binary,
};
use peril_types::GameLog;
use peril_types::routing::{EXCHANGE_PERIL_TOPIC, GAME_LOG_SLUG, wildcard_key};
use tracing::info;

/// The shared durable log queue.
pub fn game_log_binding() -> QueueBinding {
    QueueBinding::new(
        EXCHANGE_PERIL_TOPIC,
        GAME_LOG_SLUG,
        wildcard_key(GAME_LOG_SLUG),
        QueueDurability::Durable,
    )
}

/// Emit one record as a structured event.
pub fn record_game_log(log: &GameLog) -> AckType {
    info!(
        target: "peril::game_log",
        username = log.username,
        time = %log.current_time,
        message = log.message,
        "game log"
    );
    AckType::Ack
}

/// Subscribe the aggregator.
pub async fn subscribe_game_logs(
    connection: &BrokerConnection,
    options: SubscriptionConfig,
    reporter: &WorkerReporter,
) -> Result<(), PubSubError> {
    subscribe_binary(
        connection,
        &game_log_binding(),
        options,
        |log: GameLog| future::ready(record_game_log(&log)),
        reporter,
    )
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use peril_pubsub::codec::decode_binary;
    use peril_pubsub::memory::{MemoryQueue, RecordingPublisher};
    use peril_pubsub::{consume, publish_binary};

    #[test]
    fn log_queue_is_durable_and_shared() {
        let binding = game_log_binding();
        assert_eq!(binding.queue, "game_logs");
        assert_eq!(binding.routing_key, "game_logs.*");
        assert_eq!(binding.durability, QueueDurability::Durable);
    }

    #[tokio::test]
    async fn every_log_is_acknowledged() {
        let publisher = RecordingPublisher::new();
        for name in ["alice", "bob"] {
            let log = GameLog::now(name, "All warfare is based on deception.");
            publish_binary(&publisher, EXCHANGE_PERIL_TOPIC, "game_logs.x", &log)
                .await
                .unwrap();
        }
        let queue = MemoryQueue::new();
        for sent in publisher.published() {
            queue.push_message(sent.message);
        }
        // One body the aggregator cannot decode.
        queue.push(vec![0xff], None);

        consume(
            "game_logs",
            queue.deliveries(3),
            decode_binary::<GameLog>,
            |log: GameLog| future::ready(record_game_log(&log)),
            20,
        )
        .await
        .unwrap();

        assert_eq!(queue.acked().len(), 2);
        assert_eq!(queue.ready_len(), 1);
    }
}
