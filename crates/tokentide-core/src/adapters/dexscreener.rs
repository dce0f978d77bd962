//! DexScreener adapter: the primary (first-registered) source.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::adapters::SOL_PRICE_USD;
use crate::data_source::{SourceError, TokenSource};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{SourceId, TokenAddress, TokenRecord};

const DEFAULT_ENDPOINT: &str = "https://api.dexscreener.com/latest/dex/search?q=solana";
const FETCH_TIMEOUT_MS: u64 = 10_000;

/// Fetches Solana pairs from the DexScreener search endpoint.
pub struct DexScreenerSource {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
}

impl DexScreenerSource {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
        }
    }

    pub fn with_endpoint(http_client: Arc<dyn HttpClient>, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    async fn fetch_pairs(&self) -> Result<Vec<TokenRecord>, SourceError> {
        let request = HttpRequest::get(&self.endpoint)
            .with_header("accept", "application/json")
            .with_timeout_ms(FETCH_TIMEOUT_MS);

        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::transport(format!("dexscreener transport error: {}", e.message()))
        })?;

        if response.is_rate_limited() {
            return Err(SourceError::rate_limited("dexscreener rate limited (429)"));
        }
        if !response.is_success() {
            return Err(SourceError::transport(format!(
                "dexscreener returned status {}",
                response.status
            )));
        }

        let payload: SearchResponse = serde_json::from_str(&response.body).map_err(|e| {
            SourceError::malformed(format!("failed to parse dexscreener response: {e}"))
        })?;

        let tokens: Vec<TokenRecord> = payload
            .pairs
            .unwrap_or_default()
            .into_iter()
            .filter_map(normalize_pair)
            .collect();

        debug!(count = tokens.len(), "dexscreener batch normalized");
        Ok(tokens)
    }
}

impl TokenSource for DexScreenerSource {
    fn id(&self) -> SourceId {
        SourceId::Dexscreener
    }

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<TokenRecord>, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_pairs())
    }
}

/// Normalize one raw pair; `None` drops it without aborting the batch.
fn normalize_pair(pair: RawPair) -> Option<TokenRecord> {
    let base = pair.base_token?;
    let address = TokenAddress::parse(&base.address?).ok()?;
    let price_usd: f64 = pair.price_usd?.trim().parse().ok()?;

    let transactions = pair
        .txns
        .and_then(|t| t.h24)
        .map(|w| w.buys.unwrap_or(0) + w.sells.unwrap_or(0))
        .unwrap_or(0);

    TokenRecord::new(
        address,
        base.name.unwrap_or_default(),
        base.symbol.unwrap_or_default(),
        price_usd / SOL_PRICE_USD,
        pair.market_cap.unwrap_or(0.0) / SOL_PRICE_USD,
        pair.volume.and_then(|v| v.h24).unwrap_or(0.0) / SOL_PRICE_USD,
        pair.liquidity.and_then(|l| l.usd).unwrap_or(0.0) / SOL_PRICE_USD,
        transactions,
        pair.price_change.and_then(|p| p.h1).unwrap_or(0.0),
        pair.dex_id.unwrap_or_default(),
        SourceId::Dexscreener,
    )
    .ok()
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pairs: Option<Vec<RawPair>>,
}

#[derive(Debug, Deserialize)]
struct RawPair {
    #[serde(rename = "baseToken")]
    base_token: Option<RawBaseToken>,
    #[serde(rename = "priceUsd")]
    price_usd: Option<String>,
    #[serde(rename = "marketCap")]
    market_cap: Option<f64>,
    volume: Option<RawVolume>,
    liquidity: Option<RawLiquidity>,
    txns: Option<RawTxns>,
    #[serde(rename = "priceChange")]
    price_change: Option<RawPriceChange>,
    #[serde(rename = "dexId")]
    dex_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBaseToken {
    address: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawVolume {
    h24: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawLiquidity {
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTxns {
    h24: Option<RawTxnWindow>,
}

#[derive(Debug, Deserialize)]
struct RawTxnWindow {
    buys: Option<u64>,
    sells: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawPriceChange {
    h1: Option<f64>,
}
