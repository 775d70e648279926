// monitoring/mod.rs
pub mod cli;
pub mod display;
pub mod trip_trace;
