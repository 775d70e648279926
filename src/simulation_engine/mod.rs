// simulation_engine/mod.rs
pub mod interpolation;
pub mod metrics;
pub mod simulator;
pub mod stops;
