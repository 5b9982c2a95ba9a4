use tokio::sync::watch;

use crate::{process::ProcessStatus, signals::ShutdownFlag, supervisor::SupervisorError};

/// Control surface for a running supervisor.
///
/// Cheap to clone; every clone observes the same supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorHandle {
    shutdown: ShutdownFlag,
    status_rx: watch::Receiver<ProcessStatus>,
    outcome_rx: watch::Receiver<Option<Result<(), SupervisorError>>>,
}

impl SupervisorHandle {
    pub(crate) fn new(
        shutdown: ShutdownFlag,
        status_rx: watch::Receiver<ProcessStatus>,
        outcome_rx: watch::Receiver<Option<Result<(), SupervisorError>>>,
    ) -> Self {
        Self {
            shutdown,
            status_rx,
            outcome_rx,
        }
    }

    /// Requests shutdown, exactly as a termination signal would.
    ///
    /// One-shot and idempotent: calls after the first have no further effect.
    pub fn shutdown(&self) {
        self.shutdown.request();
    }

    /// Snapshot of the supervised child's current status.
    pub fn status(&self) -> ProcessStatus {
        self.status_rx.borrow().clone()
    }

    /// A watch receiver over status updates, for callers that want to await
    /// a particular state or respawn count.
    pub fn watch(&self) -> watch::Receiver<ProcessStatus> {
        self.status_rx.clone()
    }

    /// Waits for the supervisor to finish.
    ///
    /// `Ok(())` means shutdown was requested and the child is confirmed dead.
    /// May be called repeatedly and from multiple clones; every caller
    /// receives the outcome.
    pub async fn wait(&self) -> Result<(), SupervisorError> {
        let mut rx = self.outcome_rx.clone();
        let outcome = rx
            .wait_for(Option::is_some)
            .await
            .expect("supervisor task exited without reporting an outcome");
        outcome.clone().expect("outcome set when wait_for returns")
    }
}
