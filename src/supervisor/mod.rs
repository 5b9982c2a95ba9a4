pub(crate) mod builder;
pub(crate) mod handle;

use std::{io, sync::Arc, time::Duration};

use thiserror::Error;
use tokio::{process::Child, sync::watch};
use tracing::{debug, error, info};

use crate::{
    process::{ExitKind, LaunchSpec, ProcessState, ProcessStatus, SupervisedProcess},
    signals::{self, ShutdownFlag, SignalInstallError},
    spawn::{spawn_child, LaunchError},
    terminate::{terminate, TerminateConfig, TerminationError},
};
use builder::SupervisorBuilder;
use handle::SupervisorHandle;

/// When a freshly (re)launched child keeps dying, stop resurrecting it.
///
/// A death counts as rapid when the child lived for less than `window`. The
/// policy trips once a rapid death is observed after more than
/// `max_rapid_respawns` respawns. That separates a child crashing straight
/// out of launch (a configuration or environment fault, not worth retrying
/// forever) from occasional crashes under load, which keep getting recovered.
///
/// A stateless lookback from the most recent launch: no backoff, no reset
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrashLoopPolicy {
    pub window: Duration,
    pub max_rapid_respawns: u64,
}

impl Default for CrashLoopPolicy {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_rapid_respawns: 6,
        }
    }
}

impl CrashLoopPolicy {
    /// Evaluated on each death, before any respawn: `uptime` is the dead
    /// child's lifetime, `respawns` the count of respawns performed so far.
    pub fn is_tripped(&self, uptime: Duration, respawns: u64) -> bool {
        uptime < self.window && respawns > self.max_rapid_respawns
    }
}

/// Why the supervisor stopped without a requested shutdown.
///
/// Every variant is fatal; the supervisor never keeps running without a
/// correctly tracked child. Errors are cloneable so every concurrent
/// [`SupervisorHandle::wait`] caller receives the outcome.
#[derive(Debug, Clone, Error)]
pub enum SupervisorError {
    #[error("could not install signal handlers")]
    SignalInstall(#[from] SignalInstallError),
    #[error("could not launch child")]
    Launch(#[from] LaunchError),
    #[error("waiting on child failed")]
    Wait(#[source] Arc<io::Error>),
    #[error("could not terminate child during shutdown")]
    Termination(#[from] TerminationError),
    #[error("child is crash-looping: {respawns} respawns, the last life lasted {uptime:?}")]
    CrashLoop { respawns: u64, uptime: Duration },
}

/// Keeps a single child process alive.
///
/// Launches the child once, blocks waiting for it to die, and relaunches it
/// until either shutdown is requested (SIGTERM/SIGINT, or
/// [`SupervisorHandle::shutdown`]) or the [`CrashLoopPolicy`] trips.
pub struct Supervisor {
    spec: LaunchSpec,
    policy: CrashLoopPolicy,
    terminate: TerminateConfig,
    shutdown: ShutdownFlag,
    status_tx: watch::Sender<ProcessStatus>,
    status_rx: watch::Receiver<ProcessStatus>,
    outcome_tx: watch::Sender<Option<Result<(), SupervisorError>>>,
    outcome_rx: watch::Receiver<Option<Result<(), SupervisorError>>>,
}

impl Supervisor {
    /// Creates a builder for a supervisor over `spec`.
    pub fn builder(spec: LaunchSpec) -> SupervisorBuilder {
        SupervisorBuilder::new(spec)
    }

    /// Runs the supervisor, consuming it and returning a handle for external
    /// control.
    pub fn run(self) -> SupervisorHandle {
        let handle = SupervisorHandle::new(
            self.shutdown.clone(),
            self.status_rx.clone(),
            self.outcome_rx.clone(),
        );
        tokio::spawn(async move {
            let result = self.supervise().await;
            let _ = self.outcome_tx.send(Some(result));
        });
        handle
    }

    /// The supervision loop: launch, wait, classify, respawn or stop.
    async fn supervise(&self) -> Result<(), SupervisorError> {
        signals::install(&self.shutdown)?;

        let mut child = match spawn_child(&self.spec) {
            Ok(child) => child,
            Err(e) => {
                error!(program = %self.spec, error = %e, "initial launch failed");
                self.publish(ProcessState::Aborted, None, 0);
                return Err(e.into());
            }
        };
        let pid = child.id().unwrap_or(0);
        let mut record = SupervisedProcess::new(self.spec.clone(), pid);
        info!(pid, program = %record.spec(), "child launched");
        self.publish(ProcessState::Running, Some(pid), 0);

        loop {
            tokio::select! {
                // Polled first so a pending shutdown is never lost to a
                // simultaneous child event.
                biased;

                _ = self.shutdown.requested() => {
                    return self.shut_down(&mut child, &record).await;
                }

                result = child.wait() => {
                    let status = match result {
                        Ok(status) => status,
                        Err(e) => {
                            error!(pid = record.pid(), error = %e, "waiting on child failed");
                            self.publish(ProcessState::Aborted, None, record.respawns());
                            return Err(SupervisorError::Wait(Arc::new(e)));
                        }
                    };
                    let exit = ExitKind::classify(status);
                    if !exit.is_death() {
                        debug!(pid = record.pid(), %exit, "child changed state without dying");
                        continue;
                    }
                    info!(pid = record.pid(), %exit, "child died");

                    let uptime = record.uptime();
                    if self.policy.is_tripped(uptime, record.respawns()) {
                        error!(
                            respawns = record.respawns(),
                            ?uptime,
                            "child is dying too fast, giving up"
                        );
                        self.publish(ProcessState::Aborted, None, record.respawns());
                        return Err(SupervisorError::CrashLoop {
                            respawns: record.respawns(),
                            uptime,
                        });
                    }

                    child = match spawn_child(record.spec()) {
                        Ok(child) => child,
                        Err(e) => {
                            error!(program = %record.spec(), error = %e, "respawn failed, giving up");
                            self.publish(ProcessState::Aborted, None, record.respawns());
                            return Err(e.into());
                        }
                    };
                    let pid = child.id().unwrap_or(0);
                    record.respawned(pid);
                    info!(pid, respawns = record.respawns(), program = %record.spec(), "child respawned");
                    self.publish(ProcessState::Running, Some(pid), record.respawns());
                }
            }
        }
    }

    /// Terminal path for a requested shutdown: drive the child to confirmed
    /// death, then report a clean exit.
    async fn shut_down(
        &self,
        child: &mut Child,
        record: &SupervisedProcess,
    ) -> Result<(), SupervisorError> {
        info!(pid = record.pid(), "shutdown requested, terminating child");
        self.publish(
            ProcessState::ShuttingDown,
            Some(record.pid()),
            record.respawns(),
        );

        match terminate(child, record.pid(), &self.terminate).await {
            Ok(status) => {
                info!(pid = record.pid(), exit = %ExitKind::classify(status), "child terminated");
                self.publish(ProcessState::Terminated, None, record.respawns());
                Ok(())
            }
            Err(e) => {
                error!(pid = record.pid(), error = %e, "could not confirm child death");
                self.publish(ProcessState::Aborted, None, record.respawns());
                Err(e.into())
            }
        }
    }

    fn publish(&self, state: ProcessState, pid: Option<u32>, respawns: u64) {
        let _ = self.status_tx.send(ProcessStatus {
            state,
            pid,
            respawns,
        });
    }
}
