//! Error types for the coordinator process.

use peril_pubsub::{ExitReason, PubSubError, WorkerExit};

/// Errors that end the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Broker, topology or configuration failure.
    #[error("pub/sub error: {0}")]
    PubSub(#[from] PubSubError),

    /// Reading standard input failed.
    #[error("input error: {0}")]
    Input(#[from] std::io::Error),

    /// The log aggregation worker stopped.
    #[error("subscription on {queue} stopped: {reason}")]
    WorkerStopped {
        /// Queue of the stopped worker.
        queue: String,
        /// Human-readable exit reason.
        reason: String,
    },
}

impl From<WorkerExit> for ServerError {
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
