use bus_tracker::route_data::RouteConfig;
use bus_tracker::shared_data::{StopStatus, Waypoint};
use bus_tracker::simulation_engine::metrics::{RandomSpeed, ScriptedSpeed};
use bus_tracker::simulation_engine::simulator::RouteSimulator;
use bus_tracker::simulation_engine::stops::{check_stop_sequence, is_monotonic_update};
use std::sync::Arc;

fn started(speeds: Vec<u32>) -> RouteSimulator {
    let mut sim = RouteSimulator::with_speed_source(
        Arc::new(RouteConfig::default()),
        Box::new(ScriptedSpeed::new(speeds)),
    )
    .unwrap();
    sim.start();
    sim
}

#[test]
fn full_loop_wraps_progress_to_route_start() {
    let mut sim = started(vec![25]);
    for _ in 0..124 {
        sim.advance().unwrap();
    }
    assert!(sim.state().progress > 0.98);

    sim.advance().unwrap();
    let state = sim.state();
    assert!(state.progress >= 0.0 && state.progress < 0.008);
    assert_eq!(state.position, Waypoint::new(28.6100, 77.2000));
}

#[test]
fn progress_stays_in_unit_interval_over_many_loops() {
    let mut sim = started(vec![21, 28, 24]);
    for _ in 0..1000 {
        sim.advance().unwrap();
        let progress = sim.state().progress;
        assert!((0.0..1.0).contains(&progress), "progress {progress}");
    }
}

#[test]
fn distance_falls_within_a_loop_and_eta_stays_positive() {
    let mut sim = RouteSimulator::with_speed_source(
        Arc::new(RouteConfig::default()),
        Box::new(RandomSpeed::seeded(99)),
    )
    .unwrap();
    sim.start();

    let mut previous_distance = f64::INFINITY;
    for _ in 0..124 {
        sim.advance().unwrap();
        let state = sim.state();
        assert!(state.distance_km <= previous_distance);
        assert!(state.distance_km >= 0.1);
        assert!(state.eta_minutes >= 1);
        assert!((20..30).contains(&state.speed_kmh));
        // Rounded to one decimal place.
        assert!((state.distance_km * 10.0 - (state.distance_km * 10.0).round()).abs() < 1e-9);
        previous_distance = state.distance_km;
    }
}

#[test]
fn stop_ordering_holds_on_every_tick() {
    let mut sim = started(vec![20, 29]);
    let mut previous = sim.state().stops.clone();
    for _ in 0..300 {
        sim.advance().unwrap();
        let stops = &sim.state().stops;
        check_stop_sequence(stops).unwrap();
        let current = stops
            .iter()
            .filter(|s| s.status == StopStatus::Current)
            .count();
        assert!(current <= 1);
        assert!(is_monotonic_update(&previous, stops));
        previous = stops.clone();
    }
}

#[test]
fn handoff_fires_on_first_tick_past_threshold() {
    let mut sim = started(vec![26]);
    loop {
        let before = sim.snapshot();
        sim.advance().unwrap();
        let after = sim.state();
        if after.progress > 0.6 {
            // The tick before stayed at or below the threshold.
            assert!(before.progress <= 0.6);
            assert_eq!(before.stops[2].status, StopStatus::Current);

            assert_eq!(after.stops[2].status, StopStatus::Completed);
            assert_eq!(after.stops[2].eta_label, "Completed");
            assert_eq!(after.stops[3].status, StopStatus::Current);
            assert_eq!(
                after.stops[3].eta_label,
                format!("{} mins", after.eta_minutes)
            );
            break;
        }
        assert_eq!(after.stops[2].status, StopStatus::Current);
    }

    // Later ticks, including the wrap back to the start, leave stops alone.
    let frozen = sim.state().stops.clone();
    for _ in 0..200 {
        sim.advance().unwrap();
        assert_eq!(sim.state().stops, frozen);
    }
}

#[test]
fn stops_before_handoff_never_change() {
    let config = RouteConfig::default();
    let mut sim = started(vec![23]);
    for _ in 0..250 {
        sim.advance().unwrap();
        assert_eq!(sim.state().stops[0], config.stops[0]);
        assert_eq!(sim.state().stops[1], config.stops[1]);
    }
}

#[test]
fn start_resets_everything() {
    let config = RouteConfig::default();
    let mut sim = started(vec![21]);
    for _ in 0..90 {
        sim.advance().unwrap();
    }
    assert_eq!(sim.state().stops[3].status, StopStatus::Current);

    sim.start();
    let state = sim.state();
    assert_eq!(state.progress, 0.0);
    assert_eq!(state.position, config.waypoints[2]);
    assert_eq!(state.speed_kmh, 24);
    assert_eq!(state.distance_km, 1.7);
    assert_eq!(state.eta_minutes, 5);
    assert_eq!(state.stops, config.stops);
    assert_eq!(sim.ticks(), 0);
    assert_eq!(
        sim.current_stop().map(|s| s.name.as_str()),
        Some("T Point Junction")
    );
}

#[test]
fn scripted_speeds_make_runs_reproducible() {
    let mut a = started(vec![20, 25, 29, 22]);
    let mut b = started(vec![20, 25, 29, 22]);
    for _ in 0..150 {
        a.advance().unwrap();
        b.advance().unwrap();
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
