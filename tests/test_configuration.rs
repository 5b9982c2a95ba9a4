mod common;

use std::time::Duration;

use process_keeper::{ProcessState, SupervisorError, TerminateConfig};

use common::{exits_with, fast_supervisor};

#[test]
fn test_terminate_defaults() {
    let config = TerminateConfig::default();
    assert_eq!(config.attempts, 5);
    assert_eq!(config.base_delay, Duration::from_millis(500));
}

#[tokio::test]
async fn test_a_zero_respawn_budget_aborts_on_the_first_rapid_death() {
    let handle = fast_supervisor(exits_with(1))
        .with_max_rapid_respawns(0)
        .build()
        .run();

    // The initial launch is not a respawn: one relaunch happens before the
    // policy can see a count above the budget.
    match handle.wait().await {
        Err(SupervisorError::CrashLoop { respawns, .. }) => assert_eq!(respawns, 1),
        other => panic!("expected a crash-loop abort, got {other:?}"),
    }
    assert_eq!(handle.status().state, ProcessState::Aborted);
}

#[tokio::test]
async fn test_a_widened_respawn_budget_is_honored() {
    let handle = fast_supervisor(exits_with(0))
        .with_max_rapid_respawns(8)
        .build()
        .run();

    match handle.wait().await {
        Err(SupervisorError::CrashLoop { respawns, .. }) => assert_eq!(respawns, 9),
        other => panic!("expected a crash-loop abort, got {other:?}"),
    }
}
