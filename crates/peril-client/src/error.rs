//! Error types for the player process.

use peril_game::ValidationError;
use peril_pubsub::{ExitReason, PubSubError, WorkerExit};

/// Errors that end the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Broker, topology or configuration failure.
    #[error("pub/sub error: {0}")]
    PubSub(#[from] PubSubError),

    /// Reading standard input failed.
    #[error("input error: {0}")]
    Input(#[from] std::io::Error),

    /// The welcome prompt got an unusable username.
    #[error("{0}")]
    Username(#[from] ValidationError),

    /// Standard input closed before a username was entered.
    #[error("no username given")]
    NoUsername,

    /// A subscription worker stopped, so the replica would go stale.
    #[error("subscription on {queue} stopped: {reason}")]
    WorkerStopped {
        /// Queue of the stopped worker.
        queue: String,
        /// Human-readable exit reason.
        reason: String,
    },
}

impl From<WorkerExit> for ClientError {
    fn from(exit: WorkerExit) -> Self {
        let reason = match exit.reason {
            ExitReason::Closed => "delivery stream closed".to_owned(),
            ExitReason::Failed(e) => e.to_string(),
        };
        Self::WorkerStopped {
            queue: exit.queue,
            reason,
        }
    }
}
