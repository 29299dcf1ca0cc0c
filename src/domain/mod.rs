// Domain layer - Buffers, estimators and snapshot types
pub mod channel;
pub mod pulse;
pub mod ring;
pub mod sample;
pub mod snapshot;
pub mod time;
pub mod waveform;
pub mod window;
