// Latest-snapshot publication point shared by the scheduler and renderers
use crate::domain::snapshot::Snapshot;
use std::sync::Arc;
use tokio::sync::watch;

/// Holds the most recent completed snapshot. Readers never see a tick in
/// progress: a snapshot is only published once the tick that built it is
/// done.
#[derive(Clone)]
pub struct SnapshotHub {
    tx: Arc<watch::Sender<Option<Arc<Snapshot>>>>,
}

impl Default for SnapshotHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotHub {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn publish(&self, snapshot: Arc<Snapshot>) {
        // send_replace succeeds even with no subscribers
        self.tx.send_replace(Some(snapshot));
    }

    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.tx.subscribe()
    }
}
