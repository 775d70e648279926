// cli.rs
//
// Interactive menu over the static route data and a recorded trip trace.

use crate::global_variables::ROUTE_CHART_PNG;
use crate::monitoring::display::{render_bus_info, render_schedules, route_length_km};
use crate::monitoring::trip_trace::{plot_route_trace, read_trace, summarize_trace};
use crate::route_data::RouteConfig;
use std::error::Error;
use std::io::{self, stdin, stdout, Write};
use std::path::Path;

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    stdout().flush()?;
    let mut input = String::new();
    stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

// Option 3: trace summary.
pub fn show_trace_summary(trace_path: &Path) -> Result<(), Box<dyn Error>> {
    let records = read_trace(trace_path)?;
    match summarize_trace(&records) {
        Some(summary) => {
            println!("Trip trace summary ({}):", trace_path.display());
            println!("Ticks recorded: {}", summary.ticks);
            println!("Route loops: {}", summary.loops);
            println!("Average speed: {:.1} km/h", summary.average_speed_kmh);
            println!("Closest approach: {:.1} km", summary.min_distance_km);
            println!("Longest ETA: {} mins", summary.max_eta_minutes);
            match summary.handoff_tick {
                Some(tick) => println!("Stop handoff at tick {}", tick),
                None => println!("No stop handoff recorded"),
            }
        }
        None => println!("No trip trace data available."),
    }
    Ok(())
}

// Option 4: route chart.
pub fn show_route_chart(config: &RouteConfig, trace_path: &Path) -> Result<(), Box<dyn Error>> {
    let records = if trace_path.exists() {
        read_trace(trace_path)?
    } else {
        Vec::new()
    };
    plot_route_trace(config, &records, ROUTE_CHART_PNG)?;
    println!(
        "Route chart with {} traced positions saved to {}",
        records.len(),
        ROUTE_CHART_PNG
    );
    Ok(())
}

pub fn run_cli(config: &RouteConfig, trace_path: &Path) -> io::Result<()> {
    loop {
        println!("\nSchool Bus Tracker");
        println!("1. Show Pickup/Drop Schedules");
        println!("2. Show Bus and Driver Details");
        println!("3. Show Trip Trace Summary");
        println!("4. Plot Route Chart");
        println!("5. Exit");
        let choice = prompt("Enter your choice: ")?.parse::<u32>().unwrap_or(0);
        match choice {
            1 => print!("{}", render_schedules(&config.schedules)),
            2 => {
                print!("{}", render_bus_info(&config.bus_info));
                println!(
                    "  Route length: {:.2} km over {} stops",
                    route_length_km(&config.waypoints),
                    config.stops.len()
                );
            }
            3 => {
                if let Err(e) = show_trace_summary(trace_path) {
                    eprintln!("Error reading trip trace: {}", e);
                }
            }
            4 => {
                if let Err(e) = show_route_chart(config, trace_path) {
                    eprintln!("Error plotting route chart: {}", e);
                }
            }
            5 => {
                println!("Exiting.");
                return Ok(());
            }
            _ => println!("Invalid choice. Try again."),
        }
    }
}
