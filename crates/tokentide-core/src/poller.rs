//! Scheduled refresh loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::info;

use crate::aggregator::TokenAggregator;
use crate::broadcast::SnapshotBroadcaster;

/// Default delay between refresh cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);

/// Drives the aggregator on a fixed cadence and publishes each result.
///
/// The interval is measured from the end of one cycle to the start of the
/// next, so a slow cycle delays the following one instead of overlapping it.
pub struct Poller {
    aggregator: Arc<TokenAggregator>,
    broadcaster: SnapshotBroadcaster,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl Poller {
    pub fn new(
        aggregator: Arc<TokenAggregator>,
        broadcaster: SnapshotBroadcaster,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            aggregator,
            broadcaster,
            interval,
            shutdown,
        }
    }

    /// Run until the shutdown flag flips. The first refresh happens
    /// immediately.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "poller started");
        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let snapshot = self.aggregator.refresh().await;
            let delivered = self.broadcaster.publish(Arc::clone(&snapshot));
            info!(
                tokens = snapshot.len(),
                delivered, "refresh cycle completed"
            );

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = self.shutdown.changed() => break,
            }
        }
        info!("poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemorySnapshotStore;
    use crate::data_source::{SourceError, TokenSource};
    use crate::{SourceId, TokenAddress, TokenRecord};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    impl TokenSource for CountingSource {
        fn id(&self) -> SourceId {
            SourceId::Dexscreener
        }

        fn fetch<'a>(
            &'a self,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<TokenRecord>, SourceError>> + Send + 'a>>
        {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let record = TokenRecord::new(
                TokenAddress::parse("MintAAA").expect("valid address"),
                "Token",
                "TOK",
                1.0,
                0.0,
                0.0,
                0.0,
                0,
                0.0,
                "test",
                SourceId::Dexscreener,
            )
            .expect("valid record");
            Box::pin(async move { Ok(vec![record]) })
        }
    }

    #[tokio::test]
    async fn first_cycle_publishes_and_shutdown_stops_the_loop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let aggregator = Arc::new(TokenAggregator::new(
            vec![Arc::new(CountingSource {
                calls: Arc::clone(&calls),
            })],
            // Disabled store: every cycle hits the source.
            Arc::new(MemorySnapshotStore::disabled()),
        ));
        let broadcaster = SnapshotBroadcaster::default();
        let mut updates = broadcaster.subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let poller = Poller::new(
            aggregator,
            broadcaster,
            Duration::from_secs(60),
            shutdown_rx,
        );
        let handle = tokio::spawn(poller.run());

        let snapshot = tokio::time::timeout(Duration::from_secs(1), updates.recv())
            .await
            .expect("first cycle should publish promptly")
            .expect("channel open");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        shutdown_tx.send(true).expect("receiver alive");
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poller should stop promptly")
            .expect("poller task should not panic");
    }

    #[tokio::test]
    async fn poller_respects_the_interval_between_cycles() {
        let calls = Arc::new(AtomicUsize::new(0));
        let aggregator = Arc::new(TokenAggregator::new(
            vec![Arc::new(CountingSource {
                calls: Arc::clone(&calls),
            })],
            Arc::new(MemorySnapshotStore::disabled()),
        ));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let poller = Poller::new(
            aggregator,
            SnapshotBroadcaster::default(),
            Duration::from_millis(30),
            shutdown_rx,
        );
        let handle = tokio::spawn(poller.run());

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(true).expect("receiver alive");
        handle.await.expect("poller task should not panic");

        let observed = calls.load(Ordering::SeqCst);
        assert!(observed >= 2, "expected repeated cycles, saw {observed}");
    }
}
