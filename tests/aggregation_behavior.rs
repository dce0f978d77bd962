//! Fetch fan-out, merge and cache behavior across the aggregation pipeline.

use std::time::Duration;

use tokentide_tests::*;

#[tokio::test]
async fn when_sources_overlap_system_keeps_first_registered_fields() {
    let aggregator = TokenAggregator::new(
        vec![
            Arc::new(StaticSource {
                id: SourceId::Dexscreener,
                records: vec![record_full(
                    "MintShared",
                    "Dex Name",
                    100.0,
                    0.0,
                    0.0,
                    SourceId::Dexscreener,
                )],
            }),
            Arc::new(StaticSource {
                id: SourceId::Gecko,
                records: vec![record_full(
                    "MintShared",
                    "Gecko Name",
                    999.0,
                    0.0,
                    0.0,
                    SourceId::Gecko,
                )],
            }),
        ],
        Arc::new(MemorySnapshotStore::with_default_ttl()),
    );

    let snapshot = aggregator.refresh().await;

    assert_eq!(snapshot.len(), 1);
    let token = &snapshot.tokens[0];
    assert_eq!(token.name, "Dex Name");
    assert_eq!(token.volume_sol, 100.0);
    assert_eq!(token.sources, vec![SourceId::Dexscreener, SourceId::Gecko]);
}

#[tokio::test]
async fn when_one_source_fails_system_completes_with_remaining_batches() {
    let aggregator = TokenAggregator::new(
        vec![
            Arc::new(FailingSource {
                id: SourceId::Dexscreener,
            }),
            Arc::new(StaticSource {
                id: SourceId::Gecko,
                records: vec![record("MintSafe", 10.0, SourceId::Gecko)],
            }),
        ],
        Arc::new(MemorySnapshotStore::with_default_ttl()),
    );

    let snapshot = aggregator.refresh().await;

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.tokens[0].address.as_str(), "MintSafe");
    assert_eq!(snapshot.tokens[0].sources, vec![SourceId::Gecko]);
}

#[tokio::test]
async fn when_a_source_hangs_system_cuts_it_off_and_keeps_the_rest() {
    let aggregator = TokenAggregator::new(
        vec![
            Arc::new(HangingSource {
                id: SourceId::Dexscreener,
            }),
            Arc::new(StaticSource {
                id: SourceId::Jupiter,
                records: vec![record("MintFast", 5.0, SourceId::Jupiter)],
            }),
        ],
        Arc::new(MemorySnapshotStore::with_default_ttl()),
    )
    .with_fetch_timeout(Duration::from_millis(100));

    let snapshot = tokio::time::timeout(Duration::from_secs(2), aggregator.refresh())
        .await
        .expect("refresh must respect the fetch deadline");

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.tokens[0].address.as_str(), "MintFast");
}

#[tokio::test]
async fn when_every_source_fails_system_produces_an_empty_snapshot() {
    let aggregator = TokenAggregator::new(
        vec![
            Arc::new(FailingSource {
                id: SourceId::Dexscreener,
            }),
            Arc::new(FailingSource {
                id: SourceId::Gecko,
            }),
        ],
        Arc::new(MemorySnapshotStore::with_default_ttl()),
    );

    let snapshot = aggregator.refresh().await;
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn when_cache_is_live_system_serves_it_without_fetching() {
    let (source, calls) =
        CountingSource::new(SourceId::Dexscreener, vec![record("MintHot", 1.0, SourceId::Dexscreener)]);
    let aggregator = TokenAggregator::new(
        vec![Arc::new(source)],
        Arc::new(MemorySnapshotStore::new(Duration::from_secs(60))),
    );

    let first = aggregator.snapshot().await;
    let second = aggregator.snapshot().await;
    let third = aggregator.snapshot().await;

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&second, &third));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn when_cache_expires_system_fetches_again() {
    let (source, calls) =
        CountingSource::new(SourceId::Dexscreener, vec![record("MintChurn", 1.0, SourceId::Dexscreener)]);
    let aggregator = TokenAggregator::new(
        vec![Arc::new(source)],
        Arc::new(MemorySnapshotStore::new(Duration::from_millis(30))),
    );

    aggregator.snapshot().await;
    tokio::time::sleep(Duration::from_millis(60)).await;
    aggregator.snapshot().await;

    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[test]
fn when_batches_merge_system_preserves_first_seen_order() {
    let merged = merge_batches(vec![
        vec![
            record("MintUno", 1.0, SourceId::Dexscreener),
            record("MintTwo", 1.0, SourceId::Dexscreener),
        ],
        vec![
            record("MintTwo", 9.0, SourceId::Gecko),
            record("MintThree", 1.0, SourceId::Gecko),
        ],
        vec![record("MintUno", 9.0, SourceId::Jupiter)],
    ]);

    let order: Vec<&str> = merged.iter().map(|t| t.address.as_str()).collect();
    assert_eq!(order, vec!["MintUno", "MintTwo", "MintThree"]);
    assert_eq!(merged[0].sources, vec![SourceId::Dexscreener, SourceId::Jupiter]);
    assert_eq!(merged[1].sources, vec![SourceId::Dexscreener, SourceId::Gecko]);
    assert_eq!(merged[1].volume_sol, 1.0);
}
