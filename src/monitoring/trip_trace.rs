// trip_trace.rs
//
// Per-tick CSV trace of a tracking session, a summary over it, and a PNG
// chart of the route with the traced bus positions.

use crate::route_data::RouteConfig;
use crate::shared_data::{current_timestamp, SimulationState, StopStatus};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// One row of the trip trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub timestamp: u64,
    pub tick: u64,
    pub progress: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: u32,
    pub distance_km: f64,
    pub eta_minutes: u32,
    pub current_stop: String,
}

impl TickRecord {
    pub fn from_state(tick: u64, state: &SimulationState) -> Self {
        let current_stop = state
            .stops
            .iter()
            .find(|stop| stop.status == StopStatus::Current)
            .map(|stop| stop.name.clone())
            .unwrap_or_default();
        Self {
            timestamp: current_timestamp(),
            tick,
            progress: state.progress,
            latitude: state.position.latitude,
            longitude: state.position.longitude,
            speed_kmh: state.speed_kmh,
            distance_km: state.distance_km,
            eta_minutes: state.eta_minutes,
            current_stop,
        }
    }
}

/// Aggregates over a recorded trace.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSummary {
    pub ticks: usize,
    /// Times progress wrapped back to the route start.
    pub loops: usize,
    pub average_speed_kmh: f64,
    pub min_distance_km: f64,
    pub max_eta_minutes: u32,
    /// Tick at which the current stop first changed, if it did.
    pub handoff_tick: Option<u64>,
}

// Appends one record, writing the header only when the file is new.
fn log_to_csv<T: Serialize>(path: &Path, record: &T) -> Result<(), Box<dyn Error>> {
    let file_exists = path.exists() && path.metadata()?.len() > 0;
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    wtr.serialize(record)?;
    wtr.flush()?;
    Ok(())
}

pub fn log_tick<P: AsRef<Path>>(path: P, record: &TickRecord) -> Result<(), Box<dyn Error>> {
    log_to_csv(path.as_ref(), record)
}

pub fn read_trace<P: AsRef<Path>>(path: P) -> Result<Vec<TickRecord>, Box<dyn Error>> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: TickRecord = result?;
        records.push(record);
    }
    Ok(records)
}

pub fn summarize_trace(records: &[TickRecord]) -> Option<TraceSummary> {
    if records.is_empty() {
        return None;
    }

    let loops = records
        .windows(2)
        .filter(|pair| pair[1].progress < pair[0].progress)
        .count();
    let handoff_tick = records
        .windows(2)
        .find(|pair| pair[1].current_stop != pair[0].current_stop)
        .map(|pair| pair[1].tick);
    let average_speed_kmh =
        records.iter().map(|r| r.speed_kmh as f64).sum::<f64>() / records.len() as f64;
    let min_distance_km = records
        .iter()
        .map(|r| r.distance_km)
        .fold(f64::INFINITY, f64::min);
    let max_eta_minutes = records.iter().map(|r| r.eta_minutes).max().unwrap_or(0);

    Some(TraceSummary {
        ticks: records.len(),
        loops,
        average_speed_kmh,
        min_distance_km,
        max_eta_minutes,
        handoff_tick,
    })
}

/// Draws the route polyline, its stops and the traced positions to a PNG.
pub fn plot_route_trace<P: AsRef<Path>>(
    config: &RouteConfig,
    records: &[TickRecord],
    out_path: P,
) -> Result<(), Box<dyn Error>> {
    let lats = config
        .waypoints
        .iter()
        .map(|w| w.latitude)
        .chain(records.iter().map(|r| r.latitude));
    let (min_lat, max_lat) = bounds(lats).ok_or("route has no coordinates")?;
    let lons = config
        .waypoints
        .iter()
        .map(|w| w.longitude)
        .chain(records.iter().map(|r| r.longitude));
    let (min_lon, max_lon) = bounds(lons).ok_or("route has no coordinates")?;
    let pad_lat = ((max_lat - min_lat) * 0.1).max(1e-4);
    let pad_lon = ((max_lon - min_lon) * 0.1).max(1e-4);

    let root = BitMapBackend::new(out_path.as_ref(), (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let caption = format!(
        "{} {}",
        config.bus_info.route_number, config.bus_info.route_name
    );
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .margin(40)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (min_lon - pad_lon)..(max_lon + pad_lon),
            (min_lat - pad_lat)..(max_lat + pad_lat),
        )?;
    chart
        .configure_mesh()
        .x_desc("longitude")
        .y_desc("latitude")
        .draw()?;

    chart.draw_series(LineSeries::new(
        config.waypoints.iter().map(|w| (w.longitude, w.latitude)),
        &BLUE,
    ))?;
    chart.draw_series(
        records
            .iter()
            .map(|r| Circle::new((r.longitude, r.latitude), 3, RED.filled())),
    )?;
    for stop in &config.stops {
        let color = match stop.status {
            StopStatus::Completed => GREEN,
            StopStatus::Current => MAGENTA,
            StopStatus::Upcoming => BLACK,
        };
        chart.draw_series(std::iter::once(Circle::new(
            (stop.coords.longitude, stop.coords.latitude),
            6,
            color.filled(),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            stop.name.clone(),
            (stop.coords.longitude, stop.coords.latitude),
            ("sans-serif", 14),
        )))?;
    }

    root.present()?;
    log::info!("Route chart saved to {}", out_path.as_ref().display());
    Ok(())
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
