use std::{io, process::ExitStatus, sync::Arc, time::Duration};

use nix::{
    errno::Errno,
    sys::signal::{kill, Signal},
    unistd::Pid,
};
use thiserror::Error;
use tokio::{process::Child, time::timeout};
use tracing::{debug, warn};

/// Tuning for the graceful-to-forceful termination sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminateConfig {
    /// SIGTERM attempts before escalating to SIGKILL.
    pub attempts: u32,
    /// Wait after the first SIGTERM; doubles on each further attempt.
    pub base_delay: Duration,
}

impl Default for TerminateConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl TerminateConfig {
    /// Delay after the SIGTERM of `attempt` (0-based): `base_delay * 2^attempt`,
    /// exponent capped by the attempt budget.
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(self.attempts));
        self.base_delay.saturating_mul(factor)
    }
}

/// The kill or reap primitive itself failed while driving the child to
/// termination. "Child hasn't died yet" is a retry condition, never an error.
#[derive(Debug, Clone, Error)]
pub enum TerminationError {
    #[error("failed to send {signal:?} to child {pid}: {errno}")]
    Signal {
        pid: u32,
        signal: Signal,
        errno: Errno,
    },
    #[error("failed to reap child {pid}")]
    Reap {
        pid: u32,
        #[source]
        source: Arc<io::Error>,
    },
}

/// Drives a live child to termination, confirming death before returning.
///
/// Sends SIGTERM up to `config.attempts` times, waiting with a doubling delay
/// after each, then escalates to SIGKILL and reaps unconditionally (SIGKILL
/// cannot be ignored). Returns the child's final wait status once it is
/// confirmed reaped.
pub(crate) async fn terminate(
    child: &mut Child,
    pid: u32,
    config: &TerminateConfig,
) -> Result<ExitStatus, TerminationError> {
    if child.id().is_none() {
        // Already reaped by an earlier wait; the cached status confirms death.
        return reap(child, pid).await;
    }
    let target = Pid::from_raw(pid as i32);

    for attempt in 0..config.attempts {
        send(target, Signal::SIGTERM, pid)?;
        let delay = config.delay_for(attempt);
        debug!(pid, attempt = attempt + 1, ?delay, "sent SIGTERM, waiting for child to die");
        if let Ok(result) = timeout(delay, child.wait()).await {
            let status = result.map_err(|e| TerminationError::Reap {
                pid,
                source: Arc::new(e),
            })?;
            return Ok(status);
        }
    }

    warn!(
        pid,
        attempts = config.attempts,
        "child ignored SIGTERM, escalating to SIGKILL"
    );
    send(target, Signal::SIGKILL, pid)?;
    reap(child, pid).await
}

fn send(target: Pid, signal: Signal, pid: u32) -> Result<(), TerminationError> {
    kill(target, signal).map_err(|errno| TerminationError::Signal { pid, signal, errno })
}

async fn reap(child: &mut Child, pid: u32) -> Result<ExitStatus, TerminationError> {
    child.wait().await.map_err(|e| TerminationError::Reap {
        pid,
        source: Arc::new(e),
    })
}
