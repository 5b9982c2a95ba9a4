use std::time::Duration;

use tokio::sync::watch;

use crate::{
    process::{LaunchSpec, ProcessStatus},
    signals::ShutdownFlag,
    supervisor::CrashLoopPolicy,
    terminate::TerminateConfig,
    Supervisor,
};

/// Builds a [`Supervisor`] with configurable crash-loop and termination
/// settings.
///
/// The defaults preserve the classic heuristic: a death within 60 seconds of
/// launch after more than 6 respawns aborts the run, and shutdown sends up to
/// 5 SIGTERMs before resorting to SIGKILL.
pub struct SupervisorBuilder {
    spec: LaunchSpec,
    policy: CrashLoopPolicy,
    terminate: TerminateConfig,
}

impl SupervisorBuilder {
    /// Creates a builder over `spec` with default settings.
    pub fn new(spec: LaunchSpec) -> Self {
        Self {
            spec,
            policy: CrashLoopPolicy::default(),
            terminate: TerminateConfig::default(),
        }
    }

    /// Sets the lookback window under which a death counts as rapid.
    pub fn with_crash_loop_window(mut self, window: Duration) -> Self {
        self.policy.window = window;
        self
    }

    /// Sets how many respawns are tolerated before a rapid death aborts the
    /// run.
    pub fn with_max_rapid_respawns(mut self, respawns: u64) -> Self {
        self.policy.max_rapid_respawns = respawns;
        self
    }

    /// Replaces the whole crash-loop policy.
    pub fn with_crash_loop_policy(mut self, policy: CrashLoopPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the number of SIGTERM attempts before escalating to SIGKILL.
    pub fn with_term_attempts(mut self, attempts: u32) -> Self {
        self.terminate.attempts = attempts;
        self
    }

    /// Sets the wait after the first SIGTERM; it doubles on each further
    /// attempt.
    pub fn with_term_base_delay(mut self, delay: Duration) -> Self {
        self.terminate.base_delay = delay;
        self
    }

    /// Constructs the `Supervisor` with the configured settings.
    pub fn build(self) -> Supervisor {
        let (status_tx, status_rx) = watch::channel(ProcessStatus::starting());
        let (outcome_tx, outcome_rx) = watch::channel(None);
        Supervisor {
            spec: self.spec,
            policy: self.policy,
            terminate: self.terminate,
            shutdown: ShutdownFlag::new(),
            status_tx,
            status_rx,
            outcome_tx,
            outcome_rx,
        }
    }
}
