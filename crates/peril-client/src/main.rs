//! Player process for the Peril game.
//!
//! Each client keeps its own replica of the game and talks to other
//! players only through the message broker:
//!
//! ```text
//! stdin --> command loop --> perilTopic (army_moves.<user>, game_logs.<user>)
//! perilDirect (pause) -------> pause worker --+
//! perilTopic (army_moves.*) -> move worker ---+--> GameState
//! perilTopic (war.*) --------> war worker ----+
//! ```
//!
//! The client exits on `quit`, at end of input, or as soon as any
//! subscription worker stops.

mod cli;
mod error;
mod game_loop;
mod subscriptions;

use std::sync::Arc;

use clap::Parser;
use peril_game::terminal::stdin_lines;
use peril_game::{GameState, parse_username};
use peril_pubsub::{AmqpPublisher, BrokerConnection, PerilConfig, Supervisor};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::ClientError;

/// Application entry point.
///
/// Loads configuration, initializes logging, then hands over to [`run`].
///
/// # Errors
///
/// Returns an error if startup fails or a subscription worker stops.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = PerilConfig::load(&cli.config)?;

    // Logs go to stderr so they do not interleave with the prompt.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("peril-client starting");
    run(cli, &config).await?;
    Ok(())
}

async fn run(cli: Cli, config: &PerilConfig) -> Result<(), ClientError> {
    let mut input = stdin_lines();
    let username = match cli.username {
        Some(name) => parse_username(&name)?,
        None => game_loop::welcome(&mut input).await?,
    };
    info!(
        username,
        prefetch = config.subscriptions.prefetch,
        max_redeliveries = config.subscriptions.max_redeliveries,
        "configuration loaded"
    );

    let connection = BrokerConnection::connect(&config.broker.url).await?;
    let publisher = Arc::new(AmqpPublisher::open(&connection).await?);
    let state = Arc::new(GameState::new(username));

    let mut supervisor = Supervisor::new();
    subscriptions::subscribe_all(
        &connection,
        &state,
        &publisher,
        config.subscriptions,
        &supervisor.reporter(),
    )
    .await?;

    let result = game_loop::run(&mut input, &state, &*publisher, &mut supervisor).await;

    if let Err(e) = connection.close().await {
        warn!(error = %e, "failed to close broker connection");
    }
    result
}
