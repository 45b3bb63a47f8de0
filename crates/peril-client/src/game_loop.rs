//! The interactive command loop.

use std::ops::ControlFlow;

use peril_game::commands::HELP;
use peril_game::spam::spam_logs;
use peril_game::terminal::{Input, prompt};
use peril_game::{Command, GameState, parse_username};
use peril_pubsub::{Publisher, Supervisor, publish_binary, publish_json};
use peril_types::routing::{ARMY_MOVES_PREFIX, EXCHANGE_PERIL_TOPIC, GAME_LOG_SLUG, player_key};
use peril_types::{Location, UnitId};
use tracing::{info, warn};

use crate::error::ClientError;

/// Ask for a username until a valid one is entered.
pub async fn welcome(input: &mut Input) -> Result<String, ClientError> {
    println!("Welcome to the Peril client!");
    loop {
        prompt("Please enter your username: ").await?;
        let Some(line) = input.next_line().await? else {
            return Err(ClientError::NoUsername);
        };
        match parse_username(&line) {
            Ok(name) => return Ok(name),
            Err(e) => println!("{e}"),
        }
    }
}

/// Read and execute commands until `quit`, end of input, or the first
/// subscription worker exit.
pub async fn run<P: Publisher>(
    input: &mut Input,
    state: &GameState,
    publisher: &P,
    supervisor: &mut Supervisor,
) -> Result<(), ClientError> {
    println!("{HELP}");
    loop {
        prompt("> ").await?;
        tokio::select! {
            exit = supervisor.next_exit() => {
                return match exit {
                    Some(exit) => Err(exit.into()),
                    None => Ok(()),
                };
            }
            line = input.next_line() => {
                let Some(line) = line? else {
                    info!("input closed");
                    return Ok(());
                };
                let command = match Command::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                if execute(state, publisher, &command).await.is_break() {
                    println!("Quitting.");
                    return Ok(());
                }
            }
        }
    }
}

async fn execute<P: Publisher>(
    state: &GameState,
    publisher: &P,
    command: &Command,
) -> ControlFlow<()> {
    match command {
        Command::Spawn { location, rank } => match state.spawn(*location, *rank).await {
            Ok(unit) => println!(
                "Spawned a(n) {} in {} with id {}",
                unit.rank, unit.location, unit.id
            ),
            Err(e) => println!("{e}"),
        },
        Command::Move { to_location, units } => {
            move_units(state, publisher, *to_location, units).await;
        }
        Command::Status => print!("{}", state.status().await),
        Command::Spam { count } => spam(state, publisher, *count).await,
        Command::Help => println!("{HELP}"),
        Command::Quit => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

/// Publish a planned move and apply it locally only once the publish
/// succeeded.
async fn move_units<P: Publisher>(
    state: &GameState,
    publisher: &P,
    to_location: Location,
    units: &[UnitId],
) {
    let planned = match state.plan_move(to_location, units).await {
        Ok(planned) => planned,
        Err(e) => {
            println!("{e}");
            return;
        }
    };
    let key = player_key(ARMY_MOVES_PREFIX, state.username());
    match publish_json(publisher, EXCHANGE_PERIL_TOPIC, &key, &planned).await {
        Ok(()) => {
            state.commit_move(&planned).await;
            println!("Moved {} unit(s) to {to_location}", planned.units.len());
        }
        Err(e) => {
            warn!(routing_key = key, error = %e, "failed to publish move");
            println!("Move not sent: {e}");
        }
    }
}

async fn spam<P: Publisher>(state: &GameState, publisher: &P, count: usize) {
    let key = player_key(GAME_LOG_SLUG, state.username());
    let mut sent = 0usize;
    for log in spam_logs(state.username(), count) {
        if let Err(e) = publish_binary(publisher, EXCHANGE_PERIL_TOPIC, &key, &log).await {
            warn!(routing_key = key, sent, error = %e, "spam interrupted");
            println!("Spam stopped after {sent} log(s): {e}");
            return;
        }
        sent = sent.saturating_add(1);
    }
    println!("Published {sent} log(s)");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use peril_pubsub::Encoding;
    use peril_pubsub::memory::RecordingPublisher;
    use peril_types::{ArmyMove, UnitRank};

    #[tokio::test]
    async fn move_commits_only_after_publishing() {
        let state = GameState::new("alice");
        let publisher = RecordingPublisher::new();
        state
            .spawn(Location::Asia, UnitRank::Infantry)
            .await
            .unwrap();

        publisher.set_failing(true);
        move_units(&state, &publisher, Location::Europe, &[UnitId(1)]).await;
        assert!(state.snapshot().await.has_units_at(Location::Asia));

        publisher.set_failing(false);
        move_units(&state, &publisher, Location::Europe, &[UnitId(1)]).await;
        assert!(state.snapshot().await.has_units_at(Location::Europe));

        let sent = publisher.published();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].routing_key, "army_moves.alice");
        let army_move: ArmyMove = sent[0].decode(Encoding::Json).unwrap();
        assert_eq!(army_move.to_location, Location::Europe);
    }

    #[tokio::test]
    async fn spam_publishes_binary_logs() {
        let state = GameState::new("alice");
        let publisher = RecordingPublisher::new();
        spam(&state, &publisher, 3).await;
        let sent = publisher.published();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|p| p.routing_key == "game_logs.alice"));
        let binary = Encoding::Binary.content_type();
        assert!(sent.iter().all(|p| p.message.content_type == binary));
    }

    #[tokio::test]
    async fn quit_breaks_the_loop() {
        let state = GameState::new("alice");
        let publisher = RecordingPublisher::new();
        assert!(execute(&state, &publisher, &Command::Quit).await.is_break());
        let flow = execute(&state, &publisher, &Command::Status).await;
        assert!(flow.is_continue());
    }
}
