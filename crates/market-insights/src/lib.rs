pub mod config;
pub mod error;
pub mod insights;
pub mod reference;
pub mod telemetry;
