// simulator.rs
use crate::error::SimulationError;
use crate::global_variables::PROGRESS_EPSILON;
use crate::route_data::RouteConfig;
use crate::shared_data::{SimulationState, Stop, StopStatus, Waypoint};
use crate::simulation_engine::interpolation::interpolate_position;
use crate::simulation_engine::metrics::{
    eta_minutes, raw_distance_km, round_to_tenth, RandomSpeed, SpeedSource,
};
use crate::simulation_engine::stops::apply_handoff;
use std::sync::Arc;

/// Drives the synthetic bus along the configured route.
///
/// The simulator is the only writer of its `SimulationState`; everyone else
/// gets a clone through [`RouteSimulator::snapshot`].
#[derive(Debug)]
pub struct RouteSimulator {
    config: Arc<RouteConfig>,
    speed_source: Box<dyn SpeedSource>,
    state: SimulationState,
    running: bool,
    ticks: u64,
}

impl RouteSimulator {
    /// Builds a simulator over `config` with a random speed source.
    pub fn new(config: Arc<RouteConfig>) -> Result<Self, SimulationError> {
        Self::with_speed_source(config, Box::new(RandomSpeed::new()))
    }

    pub fn with_speed_source(
        config: Arc<RouteConfig>,
        speed_source: Box<dyn SpeedSource>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let state = initial_state(&config);
        Ok(Self {
            config,
            speed_source,
            state,
            running: false,
            ticks: 0,
        })
    }

    /// Resets progress, metrics and stops to their initial values and starts
    /// accepting ticks.
    pub fn start(&mut self) {
        self.state = initial_state(&self.config);
        self.ticks = 0;
        self.running = true;
        log::info!(
            "Tracking started for bus {} ({} waypoints, {} stops)",
            self.config.bus_info.id,
            self.config.waypoints.len(),
            self.config.stops.len()
        );
    }

    /// Stops accepting ticks. The last state is kept.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        log::info!(
            "Tracking stopped after {} ticks at progress {:.3}",
            self.ticks,
            self.state.progress
        );
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks applied since the last `start()`.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn snapshot(&self) -> SimulationState {
        self.state.clone()
    }

    /// Moves the bus forward by one tick.
    ///
    /// Returns `Ok(false)` without touching the state when the simulator is
    /// stopped. The new state is computed in full before it replaces the old
    /// one, so a failed tick leaves the previous snapshot intact.
    pub fn advance(&mut self) -> Result<bool, SimulationError> {
        if !self.running {
            log::debug!("Ignoring tick while stopped");
            return Ok(false);
        }

        let mut progress = self.state.progress + self.config.progress_step;
        if progress >= 1.0 - PROGRESS_EPSILON {
            progress = 0.0;
            log::info!("Bus {} completed a route loop", self.config.bus_info.id);
        }

        let position = interpolate_position(&self.config.waypoints, progress)?;

        let (min_speed, max_speed) = self.config.speed_range_kmh;
        let speed_kmh = self.speed_source.next_speed(min_speed, max_speed);

        let raw_distance = raw_distance_km(progress, self.config.initial_distance_km);
        let distance_km = round_to_tenth(raw_distance);
        let eta = eta_minutes(raw_distance, speed_kmh);

        let stops = match apply_handoff(&self.state.stops, progress, eta, &self.config.handoff) {
            Some(updated) => {
                log::info!(
                    "Stop '{}' completed, heading to '{}' (eta {} mins)",
                    updated[self.config.handoff.from_stop].name,
                    updated[self.config.handoff.to_stop].name,
                    eta
                );
                updated
            }
            None => self.state.stops.clone(),
        };

        self.state = SimulationState {
            progress,
            position,
            speed_kmh,
            distance_km,
            eta_minutes: eta,
            stops,
        };
        self.ticks += 1;

        log::debug!(
            "tick {}: progress {:.3} pos ({:.5}, {:.5}) speed {} km/h distance {:.1} km eta {} min",
            self.ticks,
            progress,
            position.latitude,
            position.longitude,
            speed_kmh,
            distance_km,
            eta
        );
        Ok(true)
    }

    /// The stop currently marked `current`, if any.
    pub fn current_stop(&self) -> Option<&Stop> {
        self.state
            .stops
            .iter()
            .find(|stop| stop.status == StopStatus::Current)
    }
}

/// State shown before the first tick: bus parked on the initial waypoint with
/// the documented speed, distance and ETA.
pub fn initial_state(config: &RouteConfig) -> SimulationState {
    let position = config
        .waypoints
        .get(config.initial_position_index)
        .copied()
        .unwrap_or(Waypoint::new(0.0, 0.0));
    SimulationState {
        progress: 0.0,
        position,
        speed_kmh: config.initial_speed_kmh,
        distance_km: config.initial_distance_km,
        eta_minutes: config.initial_eta_minutes,
        stops: config.stops.clone(),
    }
}
