mod common;

use std::time::Duration;

use common::*;
use pmon_core::error::MonitorError;
use pmon_core::mocks::DisplayEvent;
use pmon_core::{Mode, Stage};
use rstest::rstest;

#[test]
fn all_checks_pass_starts_online() {
    let (mut m, p) = online_monitor(ScriptedReporter::always(true));
    assert_eq!(m.startup().unwrap(), Mode::Online);
    assert!(m.has_session());
    assert_eq!(p.sync.count(), 1);
    let calls = p.gate.calls();
    assert_eq!((calls.wifi_calls, calls.internet_calls, calls.server_calls), (1, 1, 1));
    assert_eq!(p.display.events(), vec![DisplayEvent::Initializing]);
    assert!(p.clock.sleeps().is_empty());
}

#[rstest]
#[case::wifi(ScriptedGate::new(false, true, true), Stage::Wifi, (1, 0, 0), 0)]
#[case::internet(ScriptedGate::new(true, false, true), Stage::Internet, (1, 1, 0), 0)]
#[case::server(ScriptedGate::new(true, true, false), Stage::Server, (1, 1, 1), 1)]
fn failed_stage_short_circuits_to_offline(
    #[case] gate: ScriptedGate,
    #[case] stage: Stage,
    #[case] expected_calls: (u32, u32, u32),
    #[case] expected_syncs: u32,
) {
    let (mut m, p) = monitor(
        ScriptedBus::healthy(),
        gate,
        ScriptedReporter::always(true),
        ScriptedSync::new(true),
        fast_cadence(),
    );
    assert_eq!(m.startup().unwrap(), Mode::Offline);
    assert_eq!(m.mode(), Mode::Offline);

    let calls = p.gate.calls();
    assert_eq!(
        (calls.wifi_calls, calls.internet_calls, calls.server_calls),
        expected_calls
    );
    assert_eq!(p.sync.count(), expected_syncs);
    assert_eq!(
        p.display.events(),
        vec![
            DisplayEvent::Initializing,
            DisplayEvent::ConnectionFailed(stage)
        ]
    );
    // One failure pause, no retry of the stage.
    assert_eq!(p.clock.sleeps(), vec![Duration::from_secs(5)]);
}

#[test]
fn wifi_failure_leaves_no_session() {
    let (mut m, _p) = monitor(
        ScriptedBus::healthy(),
        ScriptedGate::new(false, true, true),
        ScriptedReporter::always(true),
        ScriptedSync::new(true),
        fast_cadence(),
    );
    m.startup().unwrap();
    assert!(!m.has_session());
}

#[test]
fn session_is_kept_after_later_stage_fails() {
    let (mut m, _p) = monitor(
        ScriptedBus::healthy(),
        ScriptedGate::new(true, false, true),
        ScriptedReporter::always(true),
        ScriptedSync::new(true),
        fast_cadence(),
    );
    m.startup().unwrap();
    assert!(m.has_session());
}

#[test]
fn clock_sync_failure_aborts_startup() {
    let (mut m, p) = monitor(
        ScriptedBus::healthy(),
        ScriptedGate::new(true, true, true),
        ScriptedReporter::always(true),
        ScriptedSync::new(false),
        fast_cadence(),
    );
    let err = m.startup().expect_err("sync failure is fatal");
    match err.downcast_ref::<MonitorError>() {
        Some(MonitorError::ClockSync(_)) => {}
        other => panic!("expected ClockSync, got: {other:?}"),
    }
    assert_eq!(p.gate.calls().server_calls, 0);
}

#[test]
fn sensor_init_is_retried_until_it_answers() {
    let cadence = pmon_core::CadenceCfg {
        failure_pause: Duration::from_secs(2),
        ..fast_cadence()
    };
    let (mut m, p) = monitor(
        ScriptedBus::new(3, Vec::new()),
        ScriptedGate::new(true, true, true),
        ScriptedReporter::always(true),
        ScriptedSync::new(true),
        cadence,
    );
    assert_eq!(m.startup().unwrap(), Mode::Online);
    assert_eq!(p.bus.log.lock().unwrap().init_calls, 4);
    let retries = p
        .display
        .events()
        .into_iter()
        .filter(|e| *e == DisplayEvent::Retrying(Stage::SensorInit))
        .count();
    assert_eq!(retries, 3);
    assert_eq!(p.clock.sleeps(), vec![Duration::from_secs(2); 3]);
}

#[test]
fn bounded_sensor_attempts_surface_exhaustion() {
    let display = pmon_core::mocks::RecordingDisplay::new();
    let mut m = pmon_core::Monitor::builder()
        .with_sensor_bus(ScriptedBus::new(u32::MAX, Vec::new()))
        .with_gate(ScriptedGate::new(true, true, true))
        .with_reporter(ScriptedReporter::always(true))
        .with_clock_sync(ScriptedSync::new(true))
        .with_display(display)
        .with_clock(pmon_traits::clock::test_clock::TestClock::new())
        .with_sensor_attempts(2)
        .build()
        .unwrap();
    let err = m.startup().expect_err("sensor never answers");
    match err.downcast_ref::<MonitorError>() {
        Some(MonitorError::RetriesExhausted {
            stage: Stage::SensorInit,
            attempts: 2,
        }) => {}
        other => panic!("expected RetriesExhausted, got: {other:?}"),
    }
}

#[test]
fn step_before_startup_is_a_state_error() {
    let (mut m, _p) = online_monitor(ScriptedReporter::always(true));
    let err = m.step().expect_err("no sensor yet");
    assert!(matches!(
        err.downcast_ref::<MonitorError>(),
        Some(MonitorError::State(_))
    ));
}
