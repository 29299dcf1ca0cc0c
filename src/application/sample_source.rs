// Port for whatever produces raw sample vectors (serial rig, simulator, tests)
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Port not found: {0}")]
    PortNotFound(String),

    #[error("Failed to open {port}: {reason}")]
    Connect { port: String, reason: String },

    /// Hiccup on a single read; the next read may well succeed.
    #[error("Transient acquisition failure: {0}")]
    Transient(String),

    /// The source is gone for good.
    #[error("Sample source unavailable: {0}")]
    Fatal(String),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Transient(_))
    }
}

#[async_trait]
pub trait SampleSource: Send {
    /// Wait for the next raw sample. May return fewer fields than expected.
    async fn next_sample(&mut self) -> Result<Vec<f64>, SourceError>;

    /// Short human-readable name used in logs.
    fn describe(&self) -> String;
}
