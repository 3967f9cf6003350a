pub mod api;
pub mod client;
pub mod deployments;
pub mod fleet;
pub mod telemetry;
