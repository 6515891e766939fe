pub mod config;
pub mod report;
pub mod store;
pub mod telemetry;
