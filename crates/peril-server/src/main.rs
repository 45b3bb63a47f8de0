//! Coordinator process for the Peril game.
//!
//! The server owns no game state. It declares the shared exchanges and the
//! dead-letter path, broadcasts pause/resume, and drains the durable
//! `game_logs` queue.
//!
//! # Architecture
//!
//! ```text
//! stdin --> console --> perilDirect (pause) --> every client
//! every client --> perilTopic (game_logs.*) --> game_logs --> aggregator
//! ```

mod aggregator;
mod cli;
mod console;
mod error;

use clap::Parser;
use peril_pubsub::{AmqpPublisher, BrokerConnection, PerilConfig, Supervisor, declare_exchanges};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::ServerError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if startup fails or the aggregator stops.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = PerilConfig::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("peril-server starting");
    run(&config).await?;
    Ok(())
}

async fn run(config: &PerilConfig) -> Result<(), ServerError> {
    let connection = BrokerConnection::connect(&config.broker.url).await?;
    declare_exchanges(&connection).await?;
    let publisher = AmqpPublisher::open(&connection).await?;

    let mut supervisor = Supervisor::new();
    aggregator::subscribe_game_logs(&connection, config.subscriptions, &supervisor.reporter())
        .await?;
    info!("coordinator ready");

    let result = console::run(&publisher, &mut supervisor).await;

    if let Err(e) = connection.close().await {
        warn!(error = %e, "failed to close broker connection");
    }
    result
}
