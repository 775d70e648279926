// Tick cadence for the simulation and the wall clock.
pub const TICK_INTERVAL_MS: u64 = 1000;
pub const CLOCK_INTERVAL_MS: u64 = 1000;

// Progress added per tick; 125 ticks cover the whole route.
pub const PROGRESS_STEP: f64 = 0.008;
// Absorbs float accumulation so the 125th tick lands on the wrap.
pub const PROGRESS_EPSILON: f64 = 1e-9;

// Initial tracking values shown before the first tick.
pub const INITIAL_POSITION_INDEX: usize = 2;
pub const INITIAL_SPEED_KMH: u32 = 24;
pub const INITIAL_DISTANCE_KM: f64 = 1.7;
pub const INITIAL_ETA_MINUTES: u32 = 5;

// Synthetic metrics.
pub const SPEED_MIN_KMH: u32 = 20;
pub const SPEED_MAX_KMH: u32 = 30;
pub const DISTANCE_SPAN_KM: f64 = 1.6;
pub const MIN_DISTANCE_KM: f64 = 0.1;
pub const MIN_ETA_MINUTES: u32 = 1;

// Stop handoff: once progress passes the threshold, `current` moves forward.
pub const HANDOFF_THRESHOLD: f64 = 0.6;
pub const HANDOFF_FROM_STOP: usize = 2;
pub const HANDOFF_TO_STOP: usize = 3;

pub const COMPLETED_LABEL: &str = "Completed";

// Output files
pub const TRIP_TRACE_CSV: &str = "trip_trace.csv";
pub const ROUTE_CHART_PNG: &str = "route_trace.png";
