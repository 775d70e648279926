// src/shared_data.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// One authored latitude/longitude pair on the route polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl Waypoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopType {
    School,
    Residential,
    Landmark,
    Junction,
}

/// Arrival state of a stop. Ordered so that a stop only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopStatus {
    Upcoming,
    Current,
    Completed,
}

impl fmt::Display for StopStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StopStatus::Completed => write!(f, "completed"),
            StopStatus::Current => write!(f, "current"),
            StopStatus::Upcoming => write!(f, "upcoming"),
        }
    }
}

/// A named, scheduled location along the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub name: String,
    pub stop_type: StopType,
    pub status: StopStatus,
    pub eta_label: String,
    /// Timetabled arrival, `HH:MM`.
    pub scheduled_time: String,
    pub coords: Waypoint,
    pub description: String,
}

/// Snapshot of the simulated bus, republished once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub progress: f64,
    pub position: Waypoint,
    pub speed_kmh: u32,
    pub distance_km: f64,
    pub eta_minutes: u32,
    pub stops: Vec<Stop>,
}

impl SimulationState {
    /// The stop the bus is heading for, falling back to the first stop.
    pub fn next_stop(&self) -> Option<&Stop> {
        self.stops
            .iter()
            .find(|stop| stop.status == StopStatus::Current)
            .or_else(|| self.stops.first())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,
    pub phone: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusInfo {
    pub id: String,
    pub route_number: String,
    pub route_name: String,
    pub driver: Driver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    Pickup,
    Drop,
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TripType::Pickup => write!(f, "Pickup"),
            TripType::Drop => write!(f, "Drop"),
        }
    }
}

/// A pickup or drop slot shown on the home view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSchedule {
    pub trip_type: TripType,
    pub route_name: String,
    pub point: String,
    pub time: String,
}

/// Head count for the students on board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveStatus {
    pub total_students: u32,
    pub present_students: u32,
    pub at_stops: u32,
    pub remaining: u32,
}

/// Seconds since the unix epoch.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
