// tracker_main.rs
use bus_tracker::control_system::tracking_session::{spawn_wall_clock, TickSnapshot, TrackingSession};
use bus_tracker::global_variables::{CLOCK_INTERVAL_MS, TICK_INTERVAL_MS, TRIP_TRACE_CSV};
use bus_tracker::monitoring::display::{format_time, render_tracking_panel};
use bus_tracker::monitoring::trip_trace::{log_tick, TickRecord};
use bus_tracker::route_data::{load_route_config, RouteConfig};
use bus_tracker::shared_data::TripType;
use bus_tracker::simulation_engine::simulator::RouteSimulator;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Duration;

struct Options {
    ticks: Option<u64>,
    config: Option<PathBuf>,
    trace: PathBuf,
    trip: TripType,
}

fn parse_args() -> Result<Options, Box<dyn Error>> {
    let mut options = Options {
        ticks: None,
        config: None,
        trace: PathBuf::from(TRIP_TRACE_CSV),
        trip: TripType::Pickup,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = || args.next().ok_or(format!("missing value for {}", arg));
        match arg.as_str() {
            "--ticks" => options.ticks = Some(value()?.parse()?),
            "--config" => options.config = Some(PathBuf::from(value()?)),
            "--trace" => options.trace = PathBuf::from(value()?),
            "--trip" => {
                options.trip = match value()?.as_str() {
                    "pickup" => TripType::Pickup,
                    "drop" => TripType::Drop,
                    other => return Err(format!("unknown trip type '{}'", other).into()),
                }
            }
            other => return Err(format!("unknown argument '{}'", other).into()),
        }
    }
    Ok(options)
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(e) = run().await {
        eprintln!("Tracker error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let options = parse_args()?;
    let config = match &options.config {
        Some(path) => load_route_config(path)?,
        None => RouteConfig::default(),
    };
    if let Some(schedule) = config.schedule_for(options.trip) {
        println!(
            "Tracking {} on {} ({} at {})",
            options.trip, schedule.route_name, schedule.point, schedule.time
        );
    }

    let config = Arc::new(config);
    let simulator = RouteSimulator::new(Arc::clone(&config))?;
    let mut session = TrackingSession::new(simulator, Duration::from_millis(TICK_INTERVAL_MS));
    let (clock_rx, clock_handle) = spawn_wall_clock(Duration::from_millis(CLOCK_INTERVAL_MS));
    let mut snapshots = session.subscribe();
    session.start();
    snapshots.borrow_and_update();

    let mut last_tick = 0u64;
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let TickSnapshot { tick, state } = snapshots.borrow_and_update().clone();
                if tick > last_tick + 1 {
                    log::warn!("Display fell behind; ticks {}..{} were not traced", last_tick + 1, tick);
                }
                last_tick = tick;
                if let Err(e) = log_tick(&options.trace, &TickRecord::from_state(tick, &state)) {
                    log::warn!("Could not append to trip trace: {}", e);
                }
                let clock = format_time(&*clock_rx.borrow());
                println!("{}", render_tracking_panel(&config, &state, &clock));
                if options.ticks.is_some_and(|limit| tick >= limit) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted.");
                break;
            }
        }
    }

    session.stop();
    clock_handle.abort();
    println!(
        "Tracking stopped after {} ticks; trace written to {}",
        session.ticks(),
        options.trace.display()
    );
    Ok(())
}
