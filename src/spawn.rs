use std::{io, sync::Arc};

use thiserror::Error;
use tokio::process::Child;

use crate::process::LaunchSpec;

/// Creating the child failed, or the target program could not be loaded.
///
/// Fatal wherever it occurs: the supervisor never keeps running without a
/// live, launched child.
#[derive(Debug, Clone, Error)]
#[error("failed to launch {program}")]
pub struct LaunchError {
    program: String,
    #[source]
    source: Arc<io::Error>,
}

/// Spawns a new child executing `spec`, returning without waiting on it.
///
/// An exec failure inside the forked child (bad path, not executable) is
/// reported back to the parent by the standard library and surfaces here as
/// an error; the failed child exits on its own and never runs supervisor
/// code.
pub(crate) fn spawn_child(spec: &LaunchSpec) -> Result<Child, LaunchError> {
    let mut cmd = spec.command();
    // Exit paths always reap the child, but an aborted supervisor task must
    // not leak it.
    cmd.kill_on_drop(true);
    cmd.spawn().map_err(|e| LaunchError {
        program: spec.program().display().to_string(),
        source: Arc::new(e),
    })
}
