// metrics.rs
//
// Synthetic speed, remaining distance and ETA for the tracking view.

use crate::global_variables::{DISTANCE_SPAN_KM, MIN_DISTANCE_KM, MIN_ETA_MINUTES};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of the per-tick speed reading.
///
/// Speed is independent noise, not derived from position, so tests swap in
/// a scripted source to make a run reproducible.
pub trait SpeedSource: Send + std::fmt::Debug {
    /// Next speed in km/h, within `[min, max)`.
    fn next_speed(&mut self, min: u32, max: u32) -> u32;
}

/// Uniform random speed.
#[derive(Debug)]
pub struct RandomSpeed {
    rng: SmallRng,
}

impl RandomSpeed {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSpeed {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedSource for RandomSpeed {
    fn next_speed(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..max)
    }
}

/// Replays a fixed list of speeds, cycling when it runs out.
#[derive(Debug, Clone)]
pub struct ScriptedSpeed {
    speeds: Vec<u32>,
    cursor: usize,
}

impl ScriptedSpeed {
    pub fn new(speeds: Vec<u32>) -> Self {
        Self { speeds, cursor: 0 }
    }
}

impl SpeedSource for ScriptedSpeed {
    fn next_speed(&mut self, min: u32, max: u32) -> u32 {
        if self.speeds.is_empty() {
            return min;
        }
        let speed = self.speeds[self.cursor % self.speeds.len()];
        self.cursor += 1;
        // Scripted values still respect the configured range.
        speed.clamp(min, max.saturating_sub(1).max(min))
    }
}

/// Remaining distance in km before rounding, counting down from `start_km`
/// and floored at the final-approach distance so it never reaches zero.
pub fn raw_distance_km(progress: f64, start_km: f64) -> f64 {
    (start_km - progress * DISTANCE_SPAN_KM).max(MIN_DISTANCE_KM)
}

/// Remaining distance rounded to one decimal place.
pub fn distance_km(progress: f64, start_km: f64) -> f64 {
    round_to_tenth(raw_distance_km(progress, start_km))
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Whole minutes to arrival, never below one.
pub fn eta_minutes(distance_km: f64, speed_kmh: u32) -> u32 {
    if speed_kmh == 0 || !distance_km.is_finite() {
        return MIN_ETA_MINUTES;
    }
    let minutes = (distance_km / speed_kmh as f64 * 60.0).floor();
    if minutes < MIN_ETA_MINUTES as f64 {
        MIN_ETA_MINUTES
    } else {
        minutes as u32
    }
}
