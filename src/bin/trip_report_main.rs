// trip_report_main.rs
use bus_tracker::global_variables::TRIP_TRACE_CSV;
use bus_tracker::monitoring::cli::run_cli;
use bus_tracker::route_data::{load_route_config, RouteConfig};
use std::path::PathBuf;

fn main() {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let trace_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(TRIP_TRACE_CSV));
    let config = match args.next() {
        Some(path) => match load_route_config(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Could not load route config {}: {}", path, e);
                return;
            }
        },
        None => RouteConfig::default(),
    };
    if let Err(e) = run_cli(&config, &trace_path) {
        eprintln!("CLI error: {}", e);
    }
}
