// display.rs
//
// Text rendering for the home and tracking views plus the small helpers they
// lean on (clock formatting, status labels, contact details).

use crate::route_data::RouteConfig;
use crate::shared_data::{BusInfo, RouteSchedule, SimulationState, StopStatus, Waypoint};
use chrono::{DateTime, TimeZone};
use std::fmt::Write;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// `HH:MM` in 24-hour form.
pub fn format_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%H:%M").to_string()
}

/// Long date, e.g. `Monday, March 3, 2025`.
pub fn format_date<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%A, %B %-d, %Y").to_string()
}

pub fn status_text(status: StopStatus) -> &'static str {
    match status {
        StopStatus::Completed => "Completed",
        StopStatus::Current => "In Progress",
        StopStatus::Upcoming => "Upcoming",
    }
}

/// Hex colour used for a stop's timeline marker.
pub fn status_color(status: StopStatus) -> &'static str {
    match status {
        StopStatus::Completed => "#22c55e",
        StopStatus::Current => "#e95028",
        StopStatus::Upcoming => "#6b7280",
    }
}

fn status_marker(status: StopStatus) -> char {
    match status {
        StopStatus::Completed => 'x',
        StopStatus::Current => '>',
        StopStatus::Upcoming => ' ',
    }
}

/// Great-circle distance in km between two points (haversine).
pub fn haversine_km(a: &Waypoint, b: &Waypoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Total length of a polyline in km.
pub fn route_length_km(waypoints: &[Waypoint]) -> f64 {
    waypoints
        .windows(2)
        .map(|pair| haversine_km(&pair[0], &pair[1]))
        .sum()
}

/// Accepts digits with an optional leading `+` and spaces, dashes or brackets.
///
/// At least one digit is required, so separator-only strings such as `"()"`
/// or `"  "` are rejected even though every character is allowed.
pub fn validate_phone_number(phone: &str) -> bool {
    let body = phone.strip_prefix('+').unwrap_or(phone);
    !body.is_empty()
        && body.chars().any(|c| c.is_ascii_digit())
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
}

/// `tel:` link for the driver's phone, or `None` when the number is malformed.
pub fn dial_uri(phone: &str) -> Option<String> {
    if !validate_phone_number(phone) {
        return None;
    }
    let digits: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    Some(format!("tel:{}", digits))
}

/// Home view: one block per pickup/drop schedule.
pub fn render_schedules(schedules: &[RouteSchedule]) -> String {
    let mut out = String::new();
    for schedule in schedules {
        let _ = writeln!(out, "{} Schedule", schedule.trip_type);
        let _ = writeln!(out, "  Route: {}", schedule.route_name);
        let _ = writeln!(out, "  {} Point: {}", schedule.trip_type, schedule.point);
        let _ = writeln!(out, "  {} Time: {}", schedule.trip_type, schedule.time);
    }
    out
}

pub fn render_bus_info(bus: &BusInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Bus {} ({})", bus.id, bus.route_number);
    let _ = writeln!(out, "  Route: {}", bus.route_name);
    let _ = writeln!(out, "  {}: {}", bus.driver.role, bus.driver.name);
    match dial_uri(&bus.driver.phone) {
        Some(uri) => {
            let _ = writeln!(out, "  Call: {}", uri);
        }
        None => {
            let _ = writeln!(out, "  Call: unavailable");
        }
    }
    out
}

/// Tracking view: header, live metrics, student counts and the stop timeline.
pub fn render_tracking_panel(
    config: &RouteConfig,
    state: &SimulationState,
    clock: &str,
) -> String {
    let bus = &config.bus_info;
    let live = &config.live_status;
    let mut out = String::new();

    let _ = writeln!(out, "Live Bus Tracking  [{}]  LIVE", clock);
    let _ = writeln!(
        out,
        "Bus {} | {} | Speed: {} km/h",
        bus.id, bus.route_number, state.speed_kmh
    );
    let _ = writeln!(
        out,
        "Position: ({:.4}, {:.4})  Progress: {:.1}%",
        state.position.latitude,
        state.position.longitude,
        state.progress * 100.0
    );
    let _ = writeln!(
        out,
        "ETA: {} mins | Distance: {:.1} km",
        state.eta_minutes, state.distance_km
    );
    if let Some(next) = state.next_stop() {
        let _ = writeln!(out, "Next stop: {} ({})", next.name, next.eta_label);
    }
    let _ = writeln!(
        out,
        "Students: {}/{} on board, {} at stops, {} remaining",
        live.present_students, live.total_students, live.at_stops, live.remaining
    );
    let _ = writeln!(out, "Route timeline:");
    for stop in &state.stops {
        let _ = writeln!(
            out,
            "  [{}] {:<20} {}  {:<11} {}",
            status_marker(stop.status),
            stop.name,
            stop.scheduled_time,
            status_text(stop.status),
            stop.eta_label
        );
    }
    let _ = writeln!(out, "Driver: {} ({})", bus.driver.name, bus.driver.phone);
    out
}
