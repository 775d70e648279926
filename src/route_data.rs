// src/route_data.rs
//
// The single source of truth for the route: waypoints, stops, initial tracking
// values and the bus/driver/schedule details shown alongside them. A
// `RouteConfig` is built once and shared (behind an `Arc`) by every simulator.

use crate::error::SimulationError;
use crate::global_variables::{
    HANDOFF_FROM_STOP, HANDOFF_THRESHOLD, HANDOFF_TO_STOP, INITIAL_DISTANCE_KM,
    INITIAL_ETA_MINUTES, INITIAL_POSITION_INDEX, INITIAL_SPEED_KMH, PROGRESS_STEP,
    SPEED_MAX_KMH, SPEED_MIN_KMH,
};
use crate::shared_data::{
    BusInfo, Driver, LiveStatus, RouteSchedule, Stop, StopStatus, StopType, TripType, Waypoint,
};
use crate::simulation_engine::stops::check_stop_sequence;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// The one-time move of `current` from one stop to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopHandoff {
    /// Fires once progress is strictly greater than this.
    pub threshold: f64,
    pub from_stop: usize,
    pub to_stop: usize,
}

impl Default for StopHandoff {
    fn default() -> Self {
        Self {
            threshold: HANDOFF_THRESHOLD,
            from_stop: HANDOFF_FROM_STOP,
            to_stop: HANDOFF_TO_STOP,
        }
    }
}

/// Everything the simulator and the views need about the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub waypoints: Vec<Waypoint>,
    pub stops: Vec<Stop>,
    pub initial_position_index: usize,
    pub initial_speed_kmh: u32,
    pub initial_distance_km: f64,
    pub initial_eta_minutes: u32,
    pub progress_step: f64,
    /// Half-open range `[min, max)` for the synthetic speed.
    pub speed_range_kmh: (u32, u32),
    pub handoff: StopHandoff,
    pub bus_info: BusInfo,
    pub schedules: Vec<RouteSchedule>,
    pub live_status: LiveStatus,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            waypoints: create_waypoints(),
            stops: create_bus_stops(),
            initial_position_index: INITIAL_POSITION_INDEX,
            initial_speed_kmh: INITIAL_SPEED_KMH,
            initial_distance_km: INITIAL_DISTANCE_KM,
            initial_eta_minutes: INITIAL_ETA_MINUTES,
            progress_step: PROGRESS_STEP,
            speed_range_kmh: (SPEED_MIN_KMH, SPEED_MAX_KMH),
            handoff: StopHandoff::default(),
            bus_info: create_bus_info(),
            schedules: create_schedules(),
            live_status: LiveStatus {
                total_students: 35,
                present_students: 28,
                at_stops: 7,
                remaining: 7,
            },
        }
    }
}

impl RouteConfig {
    /// Checks the static route data before any simulator is built on it.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.waypoints.is_empty() {
            return Err(SimulationError::EmptyRoute);
        }
        if self.waypoints.len() < 2 {
            return Err(SimulationError::TooFewWaypoints(self.waypoints.len()));
        }
        if let Some(index) = self.waypoints.iter().position(|w| !w.is_finite()) {
            return Err(SimulationError::NonFiniteCoordinate { index });
        }
        if self.initial_position_index >= self.waypoints.len() {
            return Err(SimulationError::StopIndexOutOfRange {
                index: self.initial_position_index,
                len: self.waypoints.len(),
            });
        }
        if !(self.progress_step > 0.0 && self.progress_step < 1.0) {
            return Err(SimulationError::InvalidStep(self.progress_step));
        }
        let (min, max) = self.speed_range_kmh;
        if min >= max || max == 0 {
            return Err(SimulationError::InvalidSpeedRange { min, max });
        }

        for index in [self.handoff.from_stop, self.handoff.to_stop] {
            if index >= self.stops.len() {
                return Err(SimulationError::StopIndexOutOfRange {
                    index,
                    len: self.stops.len(),
                });
            }
        }
        if self.handoff.to_stop <= self.handoff.from_stop {
            return Err(SimulationError::InvalidStopSequence(format!(
                "handoff must move forward, got {} -> {}",
                self.handoff.from_stop, self.handoff.to_stop
            )));
        }

        for stop in &self.stops {
            if NaiveTime::parse_from_str(&stop.scheduled_time, "%H:%M").is_err() {
                return Err(SimulationError::InvalidScheduledTime {
                    stop: stop.name.clone(),
                    value: stop.scheduled_time.clone(),
                });
            }
            if !stop.coords.is_finite() {
                return Err(SimulationError::InvalidStopSequence(format!(
                    "stop '{}' has non-finite coordinates",
                    stop.name
                )));
            }
        }
        check_stop_sequence(&self.stops)
    }

    pub fn schedule_for(&self, trip_type: TripType) -> Option<&RouteSchedule> {
        self.schedules.iter().find(|s| s.trip_type == trip_type)
    }
}

/// Reads a route configuration from a JSON file and validates it.
pub fn load_route_config<P: AsRef<Path>>(path: P) -> Result<RouteConfig, Box<dyn Error>> {
    let file = File::open(path.as_ref())?;
    let config: RouteConfig = serde_json::from_reader(BufReader::new(file))?;
    config.validate()?;
    log::info!(
        "Loaded route config from {} ({} waypoints, {} stops)",
        path.as_ref().display(),
        config.waypoints.len(),
        config.stops.len()
    );
    Ok(config)
}

impl Stop {
    pub fn new(
        name: &str,
        stop_type: StopType,
        status: StopStatus,
        eta_label: &str,
        scheduled_time: &str,
        coords: Waypoint,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            stop_type,
            status,
            eta_label: eta_label.to_string(),
            scheduled_time: scheduled_time.to_string(),
            coords,
            description: description.to_string(),
        }
    }
}

pub fn create_waypoints() -> Vec<Waypoint> {
    vec![
        Waypoint::new(28.6100, 77.2000), // SDVM School
        Waypoint::new(28.6115, 77.2030),
        Waypoint::new(28.6130, 77.2060), // initial bus position
        Waypoint::new(28.6145, 77.2090),
        Waypoint::new(28.6160, 77.2120), // T Point
        Waypoint::new(28.6175, 77.2150), // Huda Sector 11-12
    ]
}

pub fn create_bus_stops() -> Vec<Stop> {
    vec![
        Stop::new(
            "SDVM School",
            StopType::School,
            StopStatus::Completed,
            "Completed",
            "07:30",
            Waypoint::new(28.6100, 77.2000),
            "School pickup point",
        ),
        Stop::new(
            "Gurudwara Stop",
            StopType::Landmark,
            StopStatus::Completed,
            "Completed",
            "07:45",
            Waypoint::new(28.6125, 77.2050),
            "Religious landmark",
        ),
        Stop::new(
            "T Point Junction",
            StopType::Junction,
            StopStatus::Current,
            "2 mins",
            "07:57",
            Waypoint::new(28.6160, 77.2120),
            "Main traffic junction",
        ),
        Stop::new(
            "Huda Sector 11-12",
            StopType::Residential,
            StopStatus::Upcoming,
            "8 mins",
            "08:05",
            Waypoint::new(28.6175, 77.2150),
            "Residential area",
        ),
    ]
}

pub fn create_bus_info() -> BusInfo {
    BusInfo {
        id: "HR65 6866".to_string(),
        route_number: "Route No-20".to_string(),
        route_name: "Panipat Huda Sec.11-12 (N.H.T)".to_string(),
        driver: Driver {
            name: "Rajesh Kumar".to_string(),
            phone: "+919876543210".to_string(),
            role: "Driver".to_string(),
        },
    }
}

pub fn create_schedules() -> Vec<RouteSchedule> {
    let route_name = "Route No-20 Panipat Huda Sec.11-12 (N.H.T)".to_string();
    vec![
        RouteSchedule {
            trip_type: TripType::Pickup,
            route_name: route_name.clone(),
            point: "T Point".to_string(),
            time: "07:57".to_string(),
        },
        RouteSchedule {
            trip_type: TripType::Drop,
            route_name,
            point: "T Point".to_string(),
            time: "14:30".to_string(),
        },
    ]
}
