//! End-to-end behavior of the poll, broadcast and shutdown loop.

use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::watch;

use tokentide_tests::*;

#[tokio::test]
async fn when_the_poller_runs_subscribers_receive_each_snapshot() {
    let (source, _calls) = CountingSource::new(
        SourceId::Dexscreener,
        vec![record("MintLive", 10.0, SourceId::Dexscreener)],
    );
    let aggregator = Arc::new(TokenAggregator::new(
        vec![Arc::new(source)],
        Arc::new(MemorySnapshotStore::disabled()),
    ));
    let broadcaster = SnapshotBroadcaster::default();
    let mut updates = broadcaster.subscribe();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(
        Poller::new(
            aggregator,
            broadcaster,
            Duration::from_millis(20),
            shutdown_rx,
        )
        .run(),
    );

    let first = tokio::time::timeout(Duration::from_secs(1), updates.recv())
        .await
        .expect("first snapshot should arrive promptly")
        .expect("channel open");
    let second = tokio::time::timeout(Duration::from_secs(1), updates.recv())
        .await
        .expect("second snapshot should arrive promptly")
        .expect("channel open");

    assert_eq!(first.tokens[0].address.as_str(), "MintLive");
    assert_eq!(second.tokens[0].address.as_str(), "MintLive");
    assert!(!Arc::ptr_eq(&first, &second));

    shutdown_tx.send(true).expect("receiver alive");
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("poller must stop after shutdown")
        .expect("poller task must not panic");
}

#[tokio::test]
async fn when_every_source_fails_subscribers_see_no_empty_snapshots() {
    let aggregator = Arc::new(TokenAggregator::new(
        vec![Arc::new(FailingSource {
            id: SourceId::Dexscreener,
        })],
        Arc::new(MemorySnapshotStore::disabled()),
    ));
    let broadcaster = SnapshotBroadcaster::default();
    let mut updates = broadcaster.subscribe();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(
        Poller::new(
            aggregator,
            broadcaster,
            Duration::from_millis(10),
            shutdown_rx,
        )
        .run(),
    );

    // Give the poller a few cycles; nothing should be delivered.
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(matches!(
        updates.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));

    shutdown_tx.send(true).expect("receiver alive");
    handle.await.expect("poller task must not panic");
}

#[tokio::test]
async fn when_shutdown_is_signaled_mid_sleep_the_poller_exits_early() {
    let (source, calls) = CountingSource::new(
        SourceId::Dexscreener,
        vec![record("MintBrief", 1.0, SourceId::Dexscreener)],
    );
    let aggregator = Arc::new(TokenAggregator::new(
        vec![Arc::new(source)],
        Arc::new(MemorySnapshotStore::disabled()),
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(
        Poller::new(
            aggregator,
            SnapshotBroadcaster::default(),
            Duration::from_secs(3600),
            shutdown_rx,
        )
        .run(),
    );

    // Let the first cycle complete, then interrupt the hour-long sleep.
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown_tx.send(true).expect("receiver alive");

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("shutdown must interrupt the interval sleep")
        .expect("poller task must not panic");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn when_a_subscriber_joins_late_it_receives_only_newer_snapshots() {
    let (source, _calls) = CountingSource::new(
        SourceId::Dexscreener,
        vec![record("MintLate", 1.0, SourceId::Dexscreener)],
    );
    let aggregator = Arc::new(TokenAggregator::new(
        vec![Arc::new(source)],
        Arc::new(MemorySnapshotStore::disabled()),
    ));
    let broadcaster = SnapshotBroadcaster::default();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(
        Poller::new(
            aggregator,
            broadcaster.clone(),
            Duration::from_millis(20),
            shutdown_rx,
        )
        .run(),
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    let mut late = broadcaster.subscribe();

    let snapshot = tokio::time::timeout(Duration::from_secs(1), late.recv())
        .await
        .expect("a later cycle should reach the late subscriber")
        .expect("channel open");
    assert_eq!(snapshot.tokens[0].address.as_str(), "MintLate");

    shutdown_tx.send(true).expect("receiver alive");
    handle.await.expect("poller task must not panic");
}
