// Tick scheduler - Runs the engine one tick at a time, forever
use crate::application::engine::{TelemetryEngine, TickOutcome};
use crate::application::sample_source::SourceError;
use crate::application::snapshot_hub::SnapshotHub;
use std::time::Duration;

pub struct TickScheduler {
    engine: TelemetryEngine,
    hub: SnapshotHub,
    rest: Duration,
}

impl TickScheduler {
    pub fn new(engine: TelemetryEngine, hub: SnapshotHub, rest: Duration) -> Self {
        Self { engine, hub, rest }
    }

    /// Run until the source fails for good.
    ///
    /// The next tick is only started once the previous one has pulled its
    /// sample, updated every buffer and published its snapshot, so ticks
    /// never overlap no matter how long the source blocks.
    pub async fn run(mut self) -> Result<(), SourceError> {
        tracing::info!(
            "Tick scheduler started (source: {}, rest: {:?})",
            self.engine.describe_source(),
            self.rest
        );

        loop {
            self.step().await?;
            tokio::time::sleep(self.rest).await;
        }
    }

    /// Execute exactly one tick and publish its snapshot.
    pub async fn step(&mut self) -> Result<TickOutcome, SourceError> {
        let outcome = self.engine.tick().await.inspect_err(|e| {
            tracing::error!("Sample source failed after {} ticks: {}", self.engine.ticks(), e);
        })?;

        if let TickOutcome::Completed(snapshot) = &outcome {
            tracing::trace!(tick = snapshot.tick, "snapshot published");
            self.hub.publish(snapshot.clone());
        }

        Ok(outcome)
    }
}
