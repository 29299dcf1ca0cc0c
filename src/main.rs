// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{future::IntoFuture, net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::engine::TelemetryEngine;
use crate::application::sample_source::{SampleSource, SourceError};
use crate::application::scheduler::TickScheduler;
use crate::application::snapshot_hub::SnapshotHub;
use crate::infrastructure::config::{load_rig_config, RigConfig, SourceKind};
use crate::infrastructure::serial_source::SerialSampleSource;
use crate::infrastructure::simulated_source::SimulatedSampleSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, latest_snapshot, stream_snapshots};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let rig = load_rig_config().context("Failed to load rig configuration")?;

    // Create sample source (infrastructure layer)
    let source = open_source(&rig).await?;

    // Create engine and scheduler (application layer)
    let hub = SnapshotHub::new();
    let engine = TelemetryEngine::new(source, rig.engine_settings());
    let scheduler = TickScheduler::new(engine, hub.clone(), rig.rest());

    let state = Arc::new(AppState { hub });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/snapshot", get(latest_snapshot))
        .route("/stream", get(stream_snapshots))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = rig
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid server.bind address {:?}", rig.server.bind))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting bike-telemetry service on {}", addr);

    tokio::select! {
        result = scheduler.run() => {
            result.context("Sample acquisition stopped")?;
        }
        result = axum::serve(listener, router).into_future() => {
            result.context("HTTP server stopped")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}

async fn open_source(rig: &RigConfig) -> anyhow::Result<Box<dyn SampleSource>> {
    match rig.source.kind {
        SourceKind::Serial => {
            match SerialSampleSource::connect(&rig.source.port, rig.source.baud_rate).await {
                Ok(source) => Ok(Box::new(source)),
                Err(e @ SourceError::PortNotFound(_)) => {
                    tracing::error!("Port not found! Check that the rig is plugged in ({})", e);
                    Err(e.into())
                }
                Err(e) => {
                    tracing::error!("Unexpected error opening the rig: {}", e);
                    Err(e.into())
                }
            }
        }
        SourceKind::Simulated => {
            tracing::info!("Using simulated rig");
            Ok(Box::new(SimulatedSampleSource::new(
                rig.fields,
                rig.sample_period(),
                rig.source.seed,
            )))
        }
    }
}
