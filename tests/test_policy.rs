use std::time::Duration;

use process_keeper::CrashLoopPolicy;

#[test]
fn test_defaults_preserve_the_classic_heuristic() {
    let policy = CrashLoopPolicy::default();
    assert_eq!(policy.window, Duration::from_secs(60));
    assert_eq!(policy.max_rapid_respawns, 6);
}

#[test]
fn test_seven_rapid_respawns_trip_the_policy() {
    let policy = CrashLoopPolicy::default();

    // Deaths at t = 0, 5, 10, ... seconds: each life lasts 5 seconds, well
    // inside the window. The first six respawns are tolerated; the death
    // observed after the seventh aborts instead of launching an eighth time.
    for respawns in 0..=6 {
        assert!(!policy.is_tripped(Duration::from_secs(5), respawns));
    }
    assert!(policy.is_tripped(Duration::from_secs(5), 7));
}

#[test]
fn test_slow_deaths_never_trip() {
    let policy = CrashLoopPolicy::default();
    assert!(!policy.is_tripped(Duration::from_secs(70), 1_000));
}

#[test]
fn test_a_life_of_exactly_the_window_is_not_rapid() {
    let policy = CrashLoopPolicy::default();
    assert!(!policy.is_tripped(Duration::from_secs(60), 100));
    assert!(policy.is_tripped(Duration::from_secs(59), 100));
}

#[test]
fn test_respawns_at_the_budget_are_tolerated() {
    let policy = CrashLoopPolicy {
        window: Duration::from_secs(60),
        max_rapid_respawns: 6,
    };
    assert!(!policy.is_tripped(Duration::ZERO, 6));
    assert!(policy.is_tripped(Duration::ZERO, 7));
}
