// control_system/mod.rs
pub mod tracking_session;
