// HTTP request handlers - the renderer-facing surface
use crate::infrastructure::chunked_json::stream_from_watch;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct WindowQuery {
    pub lookback: Option<f64>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest completed snapshot, optionally re-windowed to another lookback
pub async fn latest_snapshot(
    Query(query): Query<WindowQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let Some(snapshot) = state.hub.latest() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "no snapshot yet").into_response();
    };

    match query.lookback {
        Some(lookback) => Json(snapshot.rewindowed(lookback)).into_response(),
        None => Json(snapshot.as_ref()).into_response(),
    }
}

/// Stream snapshots as they are published (one chunk per tick)
pub async fn stream_snapshots(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Check if client accepts Brotli compression
    let compress = headers
        .get("accept-encoding")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("br"))
        .unwrap_or(false);

    stream_from_watch(state.hub.subscribe(), compress).await
}
