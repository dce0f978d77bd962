//! Snapshot fan-out to push subscribers.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::Snapshot;

/// Default channel capacity; slow subscribers past this lag and resume on
/// the next snapshot.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 16;

/// Hands each completed snapshot to every live subscriber. Empty snapshots
/// are suppressed so subscribers keep showing the last good result set.
#[derive(Clone)]
pub struct SnapshotBroadcaster {
    tx: broadcast::Sender<Arc<Snapshot>>,
}

impl SnapshotBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publish a snapshot, returning how many subscribers received it.
    pub fn publish(&self, snapshot: Arc<Snapshot>) -> usize {
        if snapshot.is_empty() {
            debug!("skipping broadcast of empty snapshot");
            return 0;
        }
        // send errs only when there are no receivers.
        self.tx.send(snapshot).unwrap_or(0)
    }
}

impl Default for SnapshotBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}
