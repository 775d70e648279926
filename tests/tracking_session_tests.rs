use bus_tracker::control_system::tracking_session::TrackingSession;
use bus_tracker::monitoring::trip_trace::{log_tick, read_trace, summarize_trace, TickRecord};
use bus_tracker::route_data::RouteConfig;
use bus_tracker::simulation_engine::metrics::ScriptedSpeed;
use bus_tracker::simulation_engine::simulator::RouteSimulator;
use std::sync::Arc;
use tokio::time::Duration;

fn session() -> TrackingSession {
    let simulator = RouteSimulator::with_speed_source(
        Arc::new(RouteConfig::default()),
        Box::new(ScriptedSpeed::new(vec![24, 27])),
    )
    .unwrap();
    TrackingSession::new(simulator, Duration::from_secs(1))
}

#[tokio::test(start_paused = true)]
async fn recorded_session_captures_handoff() {
    let dir = tempfile::tempdir().unwrap();
    let trace = dir.path().join("trip_trace.csv");

    let mut session = session();
    let mut rx = session.subscribe();
    session.start();
    rx.borrow_and_update();

    for expected in 1..=80u64 {
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.tick, expected);
        log_tick(&trace, &TickRecord::from_state(snapshot.tick, &snapshot.state)).unwrap();
    }
    session.stop();

    let records = read_trace(&trace).unwrap();
    assert_eq!(records.len(), 80);
    assert_eq!(records[0].current_stop, "T Point Junction");
    assert_eq!(records[79].current_stop, "Huda Sector 11-12");

    let summary = summarize_trace(&records).unwrap();
    assert_eq!(summary.loops, 0);
    let handoff = summary.handoff_tick.unwrap();
    assert!((75..=76).contains(&handoff), "handoff at {handoff}");
    assert_eq!(summary.average_speed_kmh, 25.5);
}

#[tokio::test(start_paused = true)]
async fn no_ticks_land_after_stop() {
    let mut session = session();
    let mut rx = session.subscribe();
    session.start();
    rx.borrow_and_update();

    rx.changed().await.unwrap();
    session.stop();
    let ticks = session.ticks();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(session.ticks(), ticks);
    assert!(!rx.has_changed().unwrap_or(false));
}

#[tokio::test(start_paused = true)]
async fn slow_reader_traces_real_tick_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let trace = dir.path().join("trip_trace.csv");

    let mut session = session();
    let mut rx = session.subscribe();
    session.start();
    rx.borrow_and_update();
    tokio::time::sleep(Duration::from_millis(500)).await;

    // Read every third second, between ticks; two of each three are merged away.
    for _ in 0..30 {
        tokio::time::sleep(Duration::from_millis(3000)).await;
        let snapshot = rx.borrow_and_update().clone();
        log_tick(&trace, &TickRecord::from_state(snapshot.tick, &snapshot.state)).unwrap();
    }
    session.stop();

    let records = read_trace(&trace).unwrap();
    let ticks: Vec<u64> = records.iter().map(|r| r.tick).collect();
    assert_eq!(ticks, (1..=30).map(|n| n * 3).collect::<Vec<u64>>());

    // The handoff lands on tick 75 or 76; either way it is reported by a
    // real tick number, not a count of reads.
    let summary = summarize_trace(&records).unwrap();
    assert!(matches!(summary.handoff_tick, Some(75) | Some(78)));
}
