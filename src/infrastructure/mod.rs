// Infrastructure layer - External dependencies and adapters
pub mod chunked_json;
pub mod config;
pub mod http_history;
pub mod http_response;
pub mod json_mapper;
pub mod mqtt_feed;
pub mod wire;
