// Domain layer - Plain telemetry and dashboard types
pub mod cards;
pub mod dashboard;
pub mod summary;
pub mod telemetry;
