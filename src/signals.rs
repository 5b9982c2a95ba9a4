use std::{io, sync::Arc};

use thiserror::Error;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// One-shot "shutdown requested" indicator shared between the signal relay
/// and the supervision loop.
///
/// Tripping the flag is idempotent, and [`requested`](ShutdownFlag::requested)
/// resolves immediately when the flag was tripped before the wait began, so a
/// request can never be lost between signal delivery and entering the blocking
/// wait.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    token: CancellationToken,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Every call after the first is a no-op.
    pub fn request(&self) {
        self.token.cancel();
    }

    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once shutdown has been requested.
    pub async fn requested(&self) {
        self.token.cancelled().await;
    }
}

/// Registering a signal handler failed. Fatal: the supervisor cannot safely
/// run without a way to observe shutdown requests.
#[derive(Debug, Clone, Error)]
#[error("failed to register a handler for {signal}")]
pub struct SignalInstallError {
    signal: &'static str,
    #[source]
    source: Arc<io::Error>,
}

/// Registers listeners for SIGTERM and SIGINT and spawns the relay task that
/// trips `flag` on delivery.
///
/// Both registrations happen up front so a failure surfaces before the first
/// launch. The underlying OS handler installed by tokio only writes to a
/// wakeup pipe; the flag itself is tripped from the relay task.
pub fn install(flag: &ShutdownFlag) -> Result<(), SignalInstallError> {
    let mut term = signal(SignalKind::terminate()).map_err(|e| SignalInstallError {
        signal: "SIGTERM",
        source: Arc::new(e),
    })?;
    let mut int = signal(SignalKind::interrupt()).map_err(|e| SignalInstallError {
        signal: "SIGINT",
        source: Arc::new(e),
    })?;

    let flag = flag.clone();
    tokio::spawn(async move {
        // Keep draining so repeated signals stay absorbed; request() is a
        // no-op after the first trip.
        loop {
            tokio::select! {
                _ = term.recv() => info!("caught SIGTERM, requesting shutdown"),
                _ = int.recv() => info!("caught SIGINT, requesting shutdown"),
            }
            flag.request();
        }
    });
    Ok(())
}
