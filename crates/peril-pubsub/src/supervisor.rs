//! Out-of-band reporting of subscription worker exits.
//!
//! Workers never raise inside their loop. When a loop ends, for any
//! reason, the worker sends one [`WorkerExit`] to the [`Supervisor`],
//! and the owning process decides what to do (the binaries terminate).

use tokio::sync::mpsc;
use tracing::error;

use crate::error::PubSubError;

/// Why a subscription worker stopped.
#[derive(Debug)]
pub enum ExitReason {
    /// The delivery stream ended, usually because the channel closed.
    Closed,
    /// The worker hit a fatal error.
    Failed(PubSubError),
}

/// Report sent by a worker when its loop ends.
#[derive(Debug)]
pub struct WorkerExit {
    /// Queue the worker consumed from.
    pub queue: String,
    /// Why it stopped.
    pub reason: ExitReason,
}

/// Cloneable sending half handed to each worker.
#[derive(Debug, Clone)]
pub struct WorkerReporter {
    tx: mpsc::UnboundedSender<WorkerExit>,
}

impl WorkerReporter {
    /// Report the end of the worker for `queue`.
    pub fn report(&self, queue: String, result: Result<(), PubSubError>) {
        let reason = match result {
            Ok(()) => ExitReason::Closed,
            Err(e) => {
                error!(queue = queue, error = %e, "subscription worker failed");
                ExitReason::Failed(e)
            }
        };
        // A dropped supervisor means the process is already shutting down.
        let _ = self.tx.send(WorkerExit { queue, reason });
    }
}

/// Receives worker exits for a process.
#[derive(Debug)]
pub struct Supervisor {
    tx: mpsc::UnboundedSender<WorkerExit>,
    rx: mpsc::UnboundedReceiver<WorkerExit>,
}

impl Supervisor {
    /// Create a supervisor with no workers.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// A reporter for a new worker.
    pub fn reporter(&self) -> WorkerReporter {
        WorkerReporter {
            tx: self.tx.clone(),
        }
    }

    /// Wait for the next worker to exit.
    pub async fn next_exit(&mut self) -> Option<WorkerExit> {
        self.rx.recv().await
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}
