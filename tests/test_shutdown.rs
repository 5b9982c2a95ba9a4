mod common;

use std::time::{Duration, Instant};

use nix::{errno::Errno, sys::signal::kill, unistd::Pid};
use process_keeper::{ProcessState, ShutdownFlag};

use common::{fast_supervisor, long_lived, term_immune};

#[tokio::test]
async fn test_shutdown_terminates_the_child_and_reports_clean_exit() {
    let handle = fast_supervisor(long_lived()).build().run();

    let mut watch = handle.watch();
    let status = watch
        .wait_for(|s| s.state == ProcessState::Running)
        .await
        .unwrap()
        .clone();
    let pid = status.pid.unwrap();

    handle.shutdown();
    handle.wait().await.unwrap();
    assert_eq!(handle.status().state, ProcessState::Terminated);

    // The child is confirmed gone: the existence probe fails with ESRCH.
    let err = kill(Pid::from_raw(pid as i32), None).unwrap_err();
    assert_eq!(err, Errno::ESRCH);
}

#[tokio::test]
async fn test_repeated_shutdown_requests_are_idempotent() {
    let handle = fast_supervisor(long_lived()).build().run();

    let mut watch = handle.watch();
    watch
        .wait_for(|s| s.state == ProcessState::Running)
        .await
        .unwrap();

    let clone = handle.clone();
    handle.shutdown();
    handle.shutdown();
    clone.shutdown();

    assert!(handle.wait().await.is_ok());
    assert!(clone.wait().await.is_ok());
    assert_eq!(handle.status().state, ProcessState::Terminated);
}

#[tokio::test]
async fn test_a_term_immune_child_is_killed_within_the_escalation_budget() {
    let handle = fast_supervisor(term_immune()).build().run();

    let mut watch = handle.watch();
    watch
        .wait_for(|s| s.state == ProcessState::Running)
        .await
        .unwrap();
    // Give the shell a moment to install the trap before the TERMs start.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    handle.shutdown();
    handle.wait().await.unwrap();

    // Two attempts at a 50 ms base delay, then SIGKILL: nowhere near the
    // child's 30 s lifetime.
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(handle.status().state, ProcessState::Terminated);
}

#[tokio::test]
async fn test_a_pre_tripped_flag_resolves_immediately() {
    let flag = ShutdownFlag::new();
    assert!(!flag.is_requested());

    flag.request();
    flag.request();
    assert!(flag.is_requested());

    // Must complete without ever suspending.
    flag.requested().await;
}
