//! Core pipeline for tokentide.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - Source identifiers and the fetch trait with its provider adapters
//! - Merge, snapshot cache, aggregation and the scheduled poller
//! - Snapshot broadcast and read-side query helpers

pub mod adapters;
pub mod aggregator;
pub mod broadcast;
pub mod cache;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod merge;
pub mod poller;
pub mod query;
pub mod source;

pub use adapters::{DexScreenerSource, GeckoTerminalSource, JupiterSource, SOL_PRICE_USD};
pub use aggregator::{TokenAggregator, DEFAULT_FETCH_TIMEOUT};
pub use broadcast::{SnapshotBroadcaster, DEFAULT_BROADCAST_CAPACITY};
pub use cache::{MemorySnapshotStore, SnapshotStore, DEFAULT_CACHE_TTL};
pub use config::ServiceConfig;
pub use data_source::{SourceError, SourceErrorKind, TokenSource};
pub use domain::{AggregatedToken, Snapshot, TokenAddress, TokenRecord, UtcTimestamp};
pub use error::{CoreError, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use merge::merge_batches;
pub use poller::{Poller, DEFAULT_POLL_INTERVAL};
pub use query::{SortKey, SortOrder, TokenPage, TokenQuery, DEFAULT_PAGE_LIMIT};
pub use source::SourceId;
