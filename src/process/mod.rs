use std::{
    ffi::OsString,
    fmt,
    os::unix::process::ExitStatusExt,
    path::{Path, PathBuf},
    process::ExitStatus,
    time::{Duration, Instant},
};

use tokio::process::Command;

/// The immutable description of the command a supervisor keeps alive.
///
/// Built once at startup and reused verbatim for every respawn.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    program: PathBuf,
    args: Vec<OsString>,
}

impl LaunchSpec {
    /// Creates a launch spec for `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends a single argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The program path this spec launches.
    pub fn program(&self) -> &Path {
        &self.program
    }

    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())
    }
}

/// Restart bookkeeping for the one watched child.
///
/// Refers to at most one live child at any time; only the supervision loop
/// mutates it. The shape (identity + spec + bookkeeping) would hold for a
/// multi-child supervisor too, but this crate instantiates exactly one.
pub(crate) struct SupervisedProcess {
    pid: u32,
    spec: LaunchSpec,
    respawns: u64,
    born_at: Instant,
}

impl SupervisedProcess {
    pub(crate) fn new(spec: LaunchSpec, pid: u32) -> Self {
        Self {
            pid,
            spec,
            respawns: 0,
            born_at: Instant::now(),
        }
    }

    pub(crate) fn pid(&self) -> u32 {
        self.pid
    }

    pub(crate) fn spec(&self) -> &LaunchSpec {
        &self.spec
    }

    /// Respawns performed so far. Never reset during a run.
    pub(crate) fn respawns(&self) -> u64 {
        self.respawns
    }

    /// Time since the most recent (re)launch.
    pub(crate) fn uptime(&self) -> Duration {
        self.born_at.elapsed()
    }

    pub(crate) fn respawned(&mut self, pid: u32) {
        self.pid = pid;
        self.born_at = Instant::now();
        self.respawns += 1;
    }
}

/// Classification of a wait status reported for the child.
///
/// Only [`Exited`](ExitKind::Exited) and [`Signaled`](ExitKind::Signaled)
/// are deaths; a stopped or continued child is still alive and must not be
/// respawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Normal exit with a status code.
    Exited(i32),
    /// Killed by a signal.
    Signaled { signal: i32, core_dumped: bool },
    /// Suspended by a signal.
    Stopped(i32),
    /// Resumed after a stop.
    Continued,
}

impl ExitKind {
    pub fn classify(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            Self::Exited(code)
        } else if let Some(signal) = status.signal() {
            Self::Signaled {
                signal,
                core_dumped: status.core_dumped(),
            }
        } else if let Some(signal) = status.stopped_signal() {
            Self::Stopped(signal)
        } else {
            Self::Continued
        }
    }

    /// Whether this status means the child is gone and may be respawned.
    pub fn is_death(&self) -> bool {
        matches!(self, Self::Exited(_) | Self::Signaled { .. })
    }
}

impl fmt::Display for ExitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with status {code}"),
            Self::Signaled {
                signal,
                core_dumped: true,
            } => write!(f, "killed by signal {signal} (core dumped)"),
            Self::Signaled { signal, .. } => write!(f, "killed by signal {signal}"),
            Self::Stopped(signal) => write!(f, "stopped by signal {signal}"),
            Self::Continued => write!(f, "continued"),
        }
    }
}

/// Lifecycle state of the supervised child, as observed from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// The first launch has not completed yet.
    Starting,
    /// Child alive, supervisor blocked waiting for a state change.
    Running,
    /// Shutdown was requested; the child is being driven to termination.
    ShuttingDown,
    /// Shutdown finished with the child confirmed dead.
    Terminated,
    /// The supervisor gave up: launch failure, crash loop, or wait failure.
    Aborted,
}

impl ProcessState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated | Self::Aborted)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::ShuttingDown => write!(f, "shutting down"),
            Self::Terminated => write!(f, "terminated"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Snapshot of the supervised child published on the status channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStatus {
    pub state: ProcessState,
    /// Pid of the live child, if there is one.
    pub pid: Option<u32>,
    /// Respawns performed so far.
    pub respawns: u64,
}

impl ProcessStatus {
    pub(crate) fn starting() -> Self {
        Self {
            state: ProcessState::Starting,
            pid: None,
            respawns: 0,
        }
    }
}
