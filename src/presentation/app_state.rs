// Application state for HTTP handlers
use crate::application::snapshot_hub::SnapshotHub;

#[derive(Clone)]
pub struct AppState {
    pub hub: SnapshotHub,
}
