//! The three per-player subscriptions.
//!
//! Every queue is transient: it lives as long as this client's broker
//! connection and is deleted by the broker when the client goes away.

use std::future;
use std::sync::Arc;

use peril_game::GameState;
use peril_game::handlers::{handle_move, handle_pause, handle_war};
use peril_pubsub::{
    AmqpPublisher, BrokerConnection, PubSubError, QueueBinding, QueueDurability,
    SubscriptionConfig, WorkerReporter, subscribe_json,
};
use peril_types::routing::{
    ARMY_MOVES_PREFIX, EXCHANGE_PERIL_DIRECT, EXCHANGE_PERIL_TOPIC, PAUSE_KEY,
    WAR_RECOGNITIONS_PREFIX, player_key, wildcard_key,
};
use peril_types::{ArmyMove, PlayingState, RecognitionOfWar};

/// Binding for the pause broadcast mailbox.
pub fn pause_binding(username: &str) -> QueueBinding {
    QueueBinding::new(
        EXCHANGE_PERIL_DIRECT,
        player_key(PAUSE_KEY, username),
        PAUSE_KEY,
        QueueDurability::Transient,
    )
}

/// Binding that receives every player's moves, this player's included.
pub fn moves_binding(username: &str) -> QueueBinding {
    QueueBinding::new(
        EXCHANGE_PERIL_TOPIC,
        player_key(ARMY_MOVES_PREFIX, username),
        wildcard_key(ARMY_MOVES_PREFIX),
        QueueDurability::Transient,
    )
}

/// Binding that receives every war recognition.
pub fn war_binding(username: &str) -> QueueBinding {
    QueueBinding::new(
        EXCHANGE_PERIL_TOPIC,
        player_key(WAR_RECOGNITIONS_PREFIX, username),
        wildcard_key(WAR_RECOGNITIONS_PREFIX),
        QueueDurability::Transient,
    )
}

/// Subscribe the pause, move and war handlers.
pub async fn subscribe_all(
    connection: &BrokerConnection,
    state: &Arc<GameState>,
    publisher: &Arc<AmqpPublisher>,
    options: SubscriptionConfig,
    reporter: &WorkerReporter,
) -> Result<(), PubSubError> {
    let username = state.username();

    let pause_state = Arc::clone(state);
    subscribe_json(
        connection,
        &pause_binding(username),
        options,
        move |playing: PlayingState| future::ready(handle_pause(&pause_state, playing)),
        reporter,
    )
    .await?;

    let move_state = Arc::clone(state);
    let move_publisher = Arc::clone(publisher);
    subscribe_json(
        connection,
        &moves_binding(username),
        options,
        move |army_move: ArmyMove| {
            let state = Arc::clone(&move_state);
            let publisher = Arc::clone(&move_publisher);
            async move { handle_move(&state, &*publisher, army_move).await }
        },
        reporter,
    )
    .await?;

    let war_state = Arc::clone(state);
    let war_publisher = Arc::clone(publisher);
    subscribe_json(
        connection,
        &war_binding(username),
        options,
        move |war: RecognitionOfWar| {
            let state = Arc::clone(&war_state);
            let publisher = Arc::clone(&war_publisher);
            async move { handle_war(&state, &*publisher, &war).await }
        },
        reporter,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_player_queues_use_shared_keys() {
        let pause = pause_binding("alice");
        assert_eq!(pause.queue, "pause.alice");
        assert_eq!(pause.routing_key, "pause");
        assert_eq!(pause.exchange, "perilDirect");

        let moves = moves_binding("alice");
        assert_eq!(moves.queue, "army_moves.alice");
        assert_eq!(moves.routing_key, "army_moves.*");

        let war = war_binding("alice");
        assert_eq!(war.queue, "war.alice");
        assert_eq!(war.routing_key, "war.*");
        assert_eq!(war.durability, QueueDurability::Transient);
    }
}
