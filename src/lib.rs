//! Simulated live tracking for a school bus route.
//!
//! A [`RouteSimulator`](simulation_engine::simulator::RouteSimulator) moves a
//! bus along a fixed polyline one tick at a time; a
//! [`TrackingSession`](control_system::tracking_session::TrackingSession)
//! drives it from a tokio interval and publishes snapshots for the views.

pub mod control_system;
pub mod error;
pub mod global_variables;
pub mod monitoring;
pub mod route_data;
pub mod shared_data;
pub mod simulation_engine;
