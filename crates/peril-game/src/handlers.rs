//! Subscription handlers for the client's three inbound streams.
//!
//! Each handler applies one event to the [`GameState`] and returns the
//! verdict the engine turns into a broker acknowledgment.
//! Follow-up messages (war recognitions, game logs) are published before
//! the verdict is returned; if that publish fails the event is requeued
//! so the whole handler runs again.

use peril_pubsub::{AckType, Publisher, publish_binary, publish_json};
use peril_types::routing::{
    EXCHANGE_PERIL_TOPIC, GAME_LOG_SLUG, WAR_RECOGNITIONS_PREFIX, player_key,
};
use peril_types::{ArmyMove, GameLog, PlayingState, RecognitionOfWar};
use tracing::{info, warn};

use crate::outcome::{MoveOutcome, WarResolution};
use crate::state::GameState;

/// Apply a pause/resume broadcast. Always acknowledged.
pub fn handle_pause(state: &GameState, playing: PlayingState) -> AckType {
    let was_paused = state.set_paused(playing.is_paused);
    if was_paused != playing.is_paused {
        if playing.is_paused {
            info!(username = state.username(), "game paused");
        } else {
            info!(username = state.username(), "game resumed");
        }
    }
    AckType::Ack
}

/// Merge another player's move; on conflict, publish a war recognition
/// under this player's war key.
pub async fn handle_move<P: Publisher>(
    state: &GameState,
    publisher: &P,
    army_move: ArmyMove,
) -> AckType {
    let (outcome, defender) = state.apply_move(&army_move).await;
    match outcome {
        MoveOutcome::SamePlayer => AckType::NackDiscard,
        MoveOutcome::Safe => {
            info!(
                mover = army_move.player.username,
                to = %army_move.to_location,
                units = army_move.units.len(),
                "move detected"
            );
            AckType::Ack
        }
        MoveOutcome::MakeWar => {
            info!(
                attacker = army_move.player.username,
                location = %army_move.to_location,
                "opponent moved into occupied territory"
            );
            let recognition = RecognitionOfWar {
                attacker: army_move.player,
                defender,
            };
            let key = player_key(WAR_RECOGNITIONS_PREFIX, state.username());
            match publish_json(publisher, EXCHANGE_PERIL_TOPIC, &key, &recognition).await {
                Ok(()) => AckType::Ack,
                Err(e) => {
                    warn!(routing_key = key, error = %e, "failed to publish war recognition");
                    AckType::NackRequeue
                }
            }
        }
    }
}

/// Resolve a war this player takes part in and write a game log for it.
pub async fn handle_war<P: Publisher>(
    state: &GameState,
    publisher: &P,
    war: &RecognitionOfWar,
) -> AckType {
    let battle = match state.resolve_war(war).await {
        WarResolution::NotInvolved => return AckType::NackRequeue,
        WarResolution::NoUnits => return AckType::NackDiscard,
        WarResolution::Fought(battle) => battle,
    };

    info!(
        location = %battle.location,
        outcome = %battle.outcome,
        winner = battle.winner,
        loser = battle.loser,
        units_lost = battle.units_lost,
        "war resolved"
    );

    let log = GameLog::now(state.username(), battle.log_message());
    let key = player_key(GAME_LOG_SLUG, state.username());
    match publish_binary(publisher, EXCHANGE_PERIL_TOPIC, &key, &log).await {
        Ok(()) => AckType::Ack,
        Err(e) => {
            warn!(routing_key = key, error = %e, "failed to publish game log");
            AckType::NackRequeue
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use peril_pubsub::Encoding;
    use peril_pubsub::memory::RecordingPublisher;
    use peril_types::{Location, UnitId, UnitRank};

    #[test]
    fn pause_is_always_acknowledged() {
        let state = GameState::new("alice");
        assert_eq!(
            handle_pause(&state, PlayingState { is_paused: true }),
            AckType::Ack
        );
        assert!(state.is_paused());
        assert_eq!(
            handle_pause(&state, PlayingState { is_paused: true }),
            AckType::Ack
        );
        assert_eq!(
            handle_pause(&state, PlayingState { is_paused: false }),
            AckType::Ack
        );
        assert!(!state.is_paused());
    }

    #[tokio::test]
    async fn own_move_is_discarded_without_publishing() {
        let state = GameState::new("alice");
        let publisher = RecordingPublisher::new();
        state
            .spawn(Location::Asia, UnitRank::Infantry)
            .await
            .unwrap();
        let planned = state
            .plan_move(Location::Europe, &[UnitId(1)])
            .await
            .unwrap();

        let before = state.status().await;

        for _ in 0..2 {
            assert_eq!(
                handle_move(&state, &publisher, planned.clone()).await,
                AckType::NackDiscard
            );
            assert_eq!(state.status().await, before);
        }
        assert!(before.opponents.is_empty());
        assert!(before.player.has_units_at(Location::Asia));
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn failed_recognition_publish_requeues() {
        let alice = GameState::new("alice");
        let bob = GameState::new("bob");
        alice
            .spawn(Location::Asia, UnitRank::Infantry)
            .await
            .unwrap();
        bob.spawn(Location::Europe, UnitRank::Cavalry)
            .await
            .unwrap();
        let planned = alice
            .plan_move(Location::Europe, &[UnitId(1)])
            .await
            .unwrap();

        let publisher = RecordingPublisher::new();
        publisher.set_failing(true);
        assert_eq!(
            handle_move(&bob, &publisher, planned.clone()).await,
            AckType::NackRequeue
        );

        publisher.set_failing(false);
        assert_eq!(handle_move(&bob, &publisher, planned).await, AckType::Ack);
        let sent = publisher.published();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].routing_key, "war.bob");
        let recognition: RecognitionOfWar = sent[0].decode(Encoding::Json).unwrap();
        assert_eq!(recognition.attacker.username, "alice");
        assert_eq!(recognition.defender.username, "bob");
    }

    #[tokio::test]
    async fn failed_log_publish_requeues() {
        let alice = GameState::new("alice");
        let bob = GameState::new("bob");
        alice
            .spawn(Location::Europe, UnitRank::Artillery)
            .await
            .unwrap();
        bob.spawn(Location::Europe, UnitRank::Infantry)
            .await
            .unwrap();
        let war = RecognitionOfWar {
            attacker: alice.snapshot().await,
            defender: bob.snapshot().await,
        };

        let publisher = RecordingPublisher::new();
        publisher.set_failing(true);
        assert_eq!(
            handle_war(&bob, &publisher, &war).await,
            AckType::NackRequeue
        );
        publisher.set_failing(false);
        assert_eq!(handle_war(&bob, &publisher, &war).await, AckType::Ack);

        let sent = publisher.published();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].routing_key, "game_logs.bob");
        let log: GameLog = sent[0].decode(Encoding::Binary).unwrap();
        assert_eq!(log.message, "alice won a war against bob");
        assert!(bob.snapshot().await.units.is_empty());
    }
}
