use std::{ffi::OsString, process::ExitCode, time::Duration};

use clap::Parser;
use tracing::error;

use process_keeper::{LaunchSpec, Supervisor};

/// Keep a single command running, restarting it whenever it dies.
#[derive(Debug, Parser)]
#[command(name = "process-keeper", version, about)]
struct Cli {
    /// Seconds after a (re)launch within which a death counts as rapid
    #[arg(long, default_value_t = 60)]
    crash_window_secs: u64,

    /// Respawns tolerated before a rapid death makes the supervisor give up
    #[arg(long, default_value_t = 6)]
    max_rapid_respawns: u64,

    /// SIGTERM attempts before escalating to SIGKILL during shutdown
    #[arg(long, default_value_t = 5)]
    term_attempts: u32,

    /// Milliseconds to wait after the first SIGTERM; doubles per attempt
    #[arg(long, default_value_t = 500)]
    term_delay_ms: u64,

    /// Command to supervise, followed by its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<OsString>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt().init();

    let mut command = cli.command.into_iter();
    let Some(program) = command.next() else {
        // unreachable through clap's `required` arg
        error!("no command given");
        return ExitCode::FAILURE;
    };
    let spec = LaunchSpec::new(program).args(command);

    let handle = Supervisor::builder(spec)
        .with_crash_loop_window(Duration::from_secs(cli.crash_window_secs))
        .with_max_rapid_respawns(cli.max_rapid_respawns)
        .with_term_attempts(cli.term_attempts)
        .with_term_base_delay(Duration::from_millis(cli.term_delay_ms))
        .build()
        .run();

    match handle.wait().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let report = anyhow::Error::from(e);
            error!("{report:#}");
            ExitCode::FAILURE
        }
    }
}
