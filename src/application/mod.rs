// Application layer - Aggregation engine and session orchestration
pub mod aggregator;
pub mod dashboard_service;
pub mod stream_merger;
pub mod telemetry_source;
