// Application layer - Engine orchestration and the sample source port
pub mod engine;
pub mod sample_source;
pub mod scheduler;
pub mod snapshot_hub;
