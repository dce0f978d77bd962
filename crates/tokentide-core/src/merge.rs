//! Merge per-source batches into one deduplicated result set.

use std::collections::HashMap;

use crate::domain::{AggregatedToken, TokenRecord};
use crate::TokenAddress;

/// Merge batches keyed by token address.
///
/// Batches are consumed in the order given, which is registration order.
/// The first record seen for an address supplies every field; later
/// records for the same address only append their source tag. Output
/// order is first-seen order across all batches.
pub fn merge_batches(batches: Vec<Vec<TokenRecord>>) -> Vec<AggregatedToken> {
    let mut merged: Vec<AggregatedToken> = Vec::new();
    let mut index: HashMap<TokenAddress, usize> = HashMap::new();

    for batch in batches {
        for record in batch {
            match index.get(&record.address) {
                Some(&position) => merged[position].push_source(record.source),
                None => {
                    index.insert(record.address.clone(), merged.len());
                    merged.push(AggregatedToken::from_record(record));
                }
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceId;

    fn record(address: &str, name: &str, price_sol: f64, source: SourceId) -> TokenRecord {
        TokenRecord::new(
            TokenAddress::parse(address).expect("valid address"),
            name,
            name,
            price_sol,
            0.0,
            0.0,
            0.0,
            0,
            0.0,
            "test",
            source,
        )
        .expect("valid record")
    }

    #[test]
    fn first_batch_wins_on_overlapping_addresses() {
        let merged = merge_batches(vec![
            vec![record("MintAAA", "From Dex", 1.0, SourceId::Dexscreener)],
            vec![record("MintAAA", "From Gecko", 9.0, SourceId::Gecko)],
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "From Dex");
        assert_eq!(merged[0].price_sol, 1.0);
        assert_eq!(
            merged[0].sources,
            vec![SourceId::Dexscreener, SourceId::Gecko]
        );
    }

    #[test]
    fn distinct_addresses_keep_first_seen_order() {
        let merged = merge_batches(vec![
            vec![
                record("MintAAA", "A", 1.0, SourceId::Dexscreener),
                record("MintBBB", "B", 1.0, SourceId::Dexscreener),
            ],
            vec![record("MintCCC", "C", 1.0, SourceId::Gecko)],
        ]);

        let order: Vec<&str> = merged.iter().map(|t| t.address.as_str()).collect();
        assert_eq!(order, vec!["MintAAA", "MintBBB", "MintCCC"]);
    }

    #[test]
    fn duplicate_within_one_batch_collapses_without_duplicate_tag() {
        let merged = merge_batches(vec![vec![
            record("MintAAA", "First", 1.0, SourceId::Dexscreener),
            record("MintAAA", "Second", 2.0, SourceId::Dexscreener),
        ]]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "First");
        assert_eq!(merged[0].sources, vec![SourceId::Dexscreener]);
    }

    #[test]
    fn empty_batches_yield_empty_result() {
        assert!(merge_batches(vec![Vec::new(), Vec::new()]).is_empty());
        assert!(merge_batches(Vec::new()).is_empty());
    }
}
