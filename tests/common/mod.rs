#![allow(dead_code)]

use std::time::Duration;

use process_keeper::{LaunchSpec, Supervisor, SupervisorBuilder};

/// Builder with short termination timings so shutdown-path tests stay fast.
pub fn fast_supervisor(spec: LaunchSpec) -> SupervisorBuilder {
    Supervisor::builder(spec)
        .with_term_attempts(2)
        .with_term_base_delay(Duration::from_millis(50))
}

/// A child that exits with `code` immediately.
pub fn exits_with(code: i32) -> LaunchSpec {
    LaunchSpec::new("/bin/sh")
        .arg("-c")
        .arg(format!("exit {code}"))
}

/// A child that lives for `millis`, then exits with `code`.
pub fn short_lived(millis: u64, code: i32) -> LaunchSpec {
    LaunchSpec::new("/bin/sh")
        .arg("-c")
        .arg(format!("sleep {}; exit {code}", millis as f64 / 1000.0))
}

/// A child that stays up until it is killed.
pub fn long_lived() -> LaunchSpec {
    LaunchSpec::new("/bin/sh").arg("-c").arg("exec sleep 30")
}

/// A child that ignores SIGTERM; only SIGKILL brings it down.
///
/// The ignored disposition set by `trap` survives the exec.
pub fn term_immune() -> LaunchSpec {
    LaunchSpec::new("/bin/sh")
        .arg("-c")
        .arg("trap '' TERM; exec sleep 30")
}
