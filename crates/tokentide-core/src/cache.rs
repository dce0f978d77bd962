//! Snapshot cache behind a storage trait.
//!
//! The in-memory store is the only implementation today; the trait keeps
//! the aggregator decoupled from where snapshots live.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::domain::Snapshot;

/// Default snapshot lifetime.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Async snapshot storage. Reads return `None` for missing or expired
/// entries; writes replace whatever is stored.
pub trait SnapshotStore: Send + Sync {
    fn read<'a>(&'a self) -> Pin<Box<dyn Future<Output = Option<Arc<Snapshot>>> + Send + 'a>>;

    fn write<'a>(
        &'a self,
        snapshot: Arc<Snapshot>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

struct StoredSnapshot {
    snapshot: Arc<Snapshot>,
    expires_at: Instant,
}

/// TTL-bounded in-memory store. A zero TTL disables caching entirely:
/// writes are dropped and reads always miss.
pub struct MemorySnapshotStore {
    inner: RwLock<Option<StoredSnapshot>>,
    ttl: Duration,
}

impl MemorySnapshotStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(None),
            ttl,
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn read_live(&self) -> Option<Arc<Snapshot>> {
        let guard = self.inner.read().await;
        let stored = guard.as_ref()?;
        if Instant::now() >= stored.expires_at {
            return None;
        }
        Some(Arc::clone(&stored.snapshot))
    }

    async fn store(&self, snapshot: Arc<Snapshot>) {
        if self.ttl.is_zero() {
            return;
        }
        let mut guard = self.inner.write().await;
        *guard = Some(StoredSnapshot {
            snapshot,
            expires_at: Instant::now() + self.ttl,
        });
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read<'a>(&'a self) -> Pin<Box<dyn Future<Output = Option<Arc<Snapshot>>> + Send + 'a>> {
        Box::pin(self.read_live())
    }

    fn write<'a>(
        &'a self,
        snapshot: Arc<Snapshot>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(self.store(snapshot))
    }
}
