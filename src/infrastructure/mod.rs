// Infrastructure layer - External dependencies and adapters
pub mod chunked_json;
pub mod config;
pub mod serial_source;
pub mod simulated_source;
