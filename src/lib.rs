//! # process-keeper
//!
//! `process-keeper` keeps a single child process alive.
//! It launches a command, blocks waiting for it to die, and relaunches it,
//! while refusing to resurrect a child that keeps crashing straight out of
//! launch. Meant for environments without a full init or service manager
//! (think minimal embedded Linux) where one process simply has to stay up.
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use process_keeper::{LaunchSpec, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let spec = LaunchSpec::new("/usr/local/sbin/importantd").arg("--foreground");
//!     let handle = Supervisor::builder(spec).build().run();
//!
//!     // Returns once SIGTERM/SIGINT arrived and the child is confirmed
//!     // dead, or with an error if the child crash-loops.
//!     handle.wait().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## What you get
//!
//! * **Automatic respawns** – the child is relaunched every time it exits or
//!   is killed by a signal; a stopped (suspended) child is left alone.
//! * **Crash-loop protection** – more than 6 respawns with the latest life
//!   under 60 seconds aborts the run instead of launching again; both numbers
//!   are configurable through the [`SupervisorBuilder`].
//! * **Graceful shutdown** – SIGTERM/SIGINT (or [`SupervisorHandle::shutdown`])
//!   drive the child to confirmed death: bounded SIGTERM attempts with a
//!   doubling wait, then SIGKILL.
//! * **Observability** – every lifecycle step is narrated via `tracing`, and
//!   [`SupervisorHandle::status`] exposes pid, state, and respawn count.
//!
//! ## API overview
//!
//! | SupervisorHandle method | Purpose                                              |
//! | ----------------------- | ---------------------------------------------------- |
//! | `shutdown()`            | Request shutdown, exactly as a termination signal    |
//! | `status()`              | Snapshot of state, pid, and respawn count            |
//! | `watch()`               | Watch channel over status updates                    |
//! | `wait().await`          | Wait until shutdown completes or the supervisor aborts |
//!
//! Unix only: supervision is built on child wait statuses and
//! SIGTERM/SIGKILL delivery.

pub use process::{ExitKind, LaunchSpec, ProcessState, ProcessStatus};
pub use signals::{ShutdownFlag, SignalInstallError};
pub use spawn::LaunchError;
pub use supervisor::{
    builder::SupervisorBuilder, handle::SupervisorHandle, CrashLoopPolicy, Supervisor,
    SupervisorError,
};
pub use terminate::{TerminateConfig, TerminationError};

mod process;
mod signals;
mod spawn;
mod supervisor;
mod terminate;
