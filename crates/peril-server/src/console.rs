//! The coordinator's command loop.

use peril_game::terminal::{prompt, stdin_lines};
use peril_pubsub::{PubSubError, Publisher, Supervisor, publish_json};
use peril_types::PlayingState;
use peril_types::routing::{EXCHANGE_PERIL_DIRECT, PAUSE_KEY};
use tracing::{info, warn};

use crate::error::ServerError;

const HELP: &str = "\
Possible commands:
* pause
* resume
* help
* quit";

/// One parsed coordinator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerCommand {
    /// Broadcast a paused state.
    Pause,
    /// Broadcast a running state.
    Resume,
    /// Print the command list.
    Help,
    /// Stop the coordinator.
    Quit,
    /// Anything else, kept for the error message.
    Unknown(String),
}

impl ServerCommand {
    /// Parse a command line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let verb = line.split_whitespace().next()?;
        let command = match verb.to_lowercase().as_str() {
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "help" => Self::Help,
            "quit" => Self::Quit,
            _ => Self::Unknown(verb.to_owned()),
        };
        Some(command)
    }
}

/// Broadcast the pause flag to every player.
pub async fn broadcast_pause<P: Publisher>(
    publisher: &P,
    is_paused: bool,
) -> Result<(), PubSubError> {
    publish_json(
        publisher,
        EXCHANGE_PERIL_DIRECT,
        PAUSE_KEY,
        &PlayingState { is_paused },
    )
    .await
}

/// Read commands until `quit`, end of input, or the aggregator stops.
pub async fn run<P: Publisher>(
    publisher: &P,
    supervisor: &mut Supervisor,
) -> Result<(), ServerError> {
    let mut lines = stdin_lines();
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
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("input closed");
                    return Ok(());
                };
                match ServerCommand::parse(&line) {
                    None => {}
                    Some(ServerCommand::Pause) => send_pause(publisher, true).await,
                    Some(ServerCommand::Resume) => send_pause(publisher, false).await,
                    Some(ServerCommand::Help) => println!("{HELP}"),
                    Some(ServerCommand::Quit) => {
                        println!("Exiting.");
                        return Ok(());
                    }
                    Some(ServerCommand::Unknown(verb)) => println!("unknown command: {verb}"),
                }
            }
        }
    }
}

async fn send_pause<P: Publisher>(publisher: &P, is_paused: bool) {
    let action = if is_paused { "pause" } else { "resume" };
    match broadcast_pause(publisher, is_paused).await {
        Ok(()) => {
            info!(is_paused, "playing state broadcast");
            println!("Sent {action} to all players.");
        }
        Err(e) => {
            warn!(is_paused, error = %e, "failed to broadcast playing state");
            println!("Could not send {action}: {e}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use peril_pubsub::Encoding;
    use peril_pubsub::memory::RecordingPublisher;

    #[test]
    fn parses_commands() {
        assert_eq!(ServerCommand::parse(" Pause "), Some(ServerCommand::Pause));
        assert_eq!(
            ServerCommand::parse("resume now"),
            Some(ServerCommand::Resume)
        );
        assert_eq!(ServerCommand::parse(""), None);
        assert_eq!(
            ServerCommand::parse("nuke"),
            Some(ServerCommand::Unknown("nuke".to_owned()))
        );
    }

    #[tokio::test]
    async fn pause_goes_to_the_direct_exchange() {
        let publisher = RecordingPublisher::new();
        broadcast_pause(&publisher, true).await.unwrap();
        broadcast_pause(&publisher, false).await.unwrap();

        let sent = publisher.published();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].exchange, "perilDirect");
        assert_eq!(sent[0].routing_key, "pause");
        let first: PlayingState = sent[0].decode(Encoding::Json).unwrap();
        let second: PlayingState = sent[1].decode(Encoding::Json).unwrap();
        assert!(first.is_paused);
        assert!(!second.is_paused);
    }

    #[tokio::test]
    async fn failed_broadcast_is_reported() {
        let publisher = RecordingPublisher::new();
        publisher.set_failing(true);
        assert!(matches!(
            broadcast_pause(&publisher, true).await,
            Err(PubSubError::Transport(_))
        ));
    }
}
