//! Fetch fan-out, merge and snapshot caching.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::cache::SnapshotStore;
use crate::data_source::TokenSource;
use crate::domain::Snapshot;
use crate::merge::merge_batches;

/// Default per-source fetch deadline.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Coordinates the registered sources: fans fetches out concurrently,
/// merges the batches in registration order and caches the result.
///
/// A refresh never fails: a source that errors, times out or panics
/// contributes an empty batch and the cycle completes with whatever the
/// remaining sources returned.
pub struct TokenAggregator {
    sources: Vec<Arc<dyn TokenSource>>,
    store: Arc<dyn SnapshotStore>,
    fetch_timeout: Duration,
}

impl TokenAggregator {
    pub fn new(sources: Vec<Arc<dyn TokenSource>>, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            sources,
            store,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Cached snapshot if one is live, otherwise a fresh refresh.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        if let Some(cached) = self.store.read().await {
            debug!(tokens = cached.len(), "serving cached snapshot");
            return cached;
        }
        self.refresh().await
    }

    /// Cached snapshot only; never triggers a fetch cycle.
    pub async fn peek(&self) -> Option<Arc<Snapshot>> {
        self.store.read().await
    }

    /// Run one full fetch-merge-store cycle and return the new snapshot.
    pub async fn refresh(&self) -> Arc<Snapshot> {
        let handles: Vec<_> = self
            .sources
            .iter()
            .map(|source| {
                let source = Arc::clone(source);
                let deadline = self.fetch_timeout;
                tokio::spawn(async move { fetch_soft(source, deadline).await })
            })
            .collect();

        let mut batches = Vec::with_capacity(handles.len());
        for handle in handles {
            let batch = handle.await.unwrap_or_else(|e| {
                warn!(error = %e, "source task aborted, treating as empty batch");
                Vec::new()
            });
            batches.push(batch);
        }

        let snapshot = Arc::new(Snapshot::new(merge_batches(batches)));
        self.store.write(Arc::clone(&snapshot)).await;
        snapshot
    }
}

/// Fetch one source, absorbing failure and the deadline into an empty batch.
async fn fetch_soft(
    source: Arc<dyn TokenSource>,
    deadline: Duration,
) -> Vec<crate::TokenRecord> {
    let id = source.id();
    match timeout(deadline, source.fetch()).await {
        Ok(Ok(records)) => {
            debug!(source = %id, count = records.len(), "source batch fetched");
            records
        }
        Ok(Err(error)) => {
            warn!(source = %id, error = %error, "source fetch failed");
            Vec::new()
        }
        Err(_) => {
            warn!(source = %id, timeout_ms = deadline.as_millis() as u64, "source fetch timed out");
            Vec::new()
        }
    }
}
