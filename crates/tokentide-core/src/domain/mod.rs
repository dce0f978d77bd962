//! Canonical domain types shared by every pipeline stage.

mod address;
mod timestamp;
mod token;

pub use address::TokenAddress;
pub use timestamp::UtcTimestamp;
pub use token::{AggregatedToken, Snapshot, TokenRecord};
