//! Provider adapters: one module per registered source.
//!
//! Each adapter owns its raw payload shapes and a per-record normalizer
//! that converts a provider record into a [`crate::TokenRecord`] or drops
//! it. Normalizers never abort a batch; a record missing its identity or
//! price simply yields `None`.

mod dexscreener;
mod geckoterminal;
mod jupiter;

pub use dexscreener::DexScreenerSource;
pub use geckoterminal::GeckoTerminalSource;
pub use jupiter::JupiterSource;

use serde::Deserialize;

/// Fixed SOL/USD conversion applied to provider figures quoted in USD.
/// Real price-oracle accuracy is out of scope for this service.
pub const SOL_PRICE_USD: f64 = 150.0;

/// Some providers quote numeric fields as JSON numbers, others as decimal
/// strings (GeckoTerminal does both across endpoint versions). This wrapper
/// accepts either and exposes a plain `f64`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(value) => value.trim().parse().ok(),
        }
    }
}
