pub mod autopilot;
pub mod telemetry;
