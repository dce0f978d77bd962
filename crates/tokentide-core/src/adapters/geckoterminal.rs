//! GeckoTerminal adapter: Solana pool listings from the public v2 API.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::adapters::{RawNumber, SOL_PRICE_USD};
use crate::data_source::{SourceError, TokenSource};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{SourceId, TokenAddress, TokenRecord};

const DEFAULT_ENDPOINT: &str = "https://api.geckoterminal.com/api/v2/networks/solana/pools?page=1";
const FETCH_TIMEOUT_MS: u64 = 10_000;

/// Fetches Solana pools from GeckoTerminal and projects each pool onto its
/// base token.
pub struct GeckoTerminalSource {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
}

impl GeckoTerminalSource {
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

    async fn fetch_pools(&self) -> Result<Vec<TokenRecord>, SourceError> {
        let request = HttpRequest::get(&self.endpoint)
            .with_header("accept", "application/json")
            .with_timeout_ms(FETCH_TIMEOUT_MS);

        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::transport(format!("geckoterminal transport error: {}", e.message()))
        })?;

        if response.is_rate_limited() {
            return Err(SourceError::rate_limited("geckoterminal rate limited (429)"));
        }
        if !response.is_success() {
            return Err(SourceError::transport(format!(
                "geckoterminal returned status {}",
                response.status
            )));
        }

        let payload: PoolsResponse = serde_json::from_str(&response.body).map_err(|e| {
            SourceError::malformed(format!("failed to parse geckoterminal response: {e}"))
        })?;

        let tokens: Vec<TokenRecord> = payload
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(normalize_pool)
            .collect();

        debug!(count = tokens.len(), "geckoterminal batch normalized");
        Ok(tokens)
    }
}

impl TokenSource for GeckoTerminalSource {
    fn id(&self) -> SourceId {
        SourceId::Gecko
    }

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<TokenRecord>, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_pools())
    }
}

/// Pool ids carry the base-token mint as `solana_<mint>`. Pools without a
/// resolvable mint or a usable price are dropped.
fn normalize_pool(pool: RawPool) -> Option<TokenRecord> {
    let attrs = pool.attributes?;

    let mint = pool
        .relationships
        .as_ref()
        .and_then(|r| r.base_token.as_ref())
        .and_then(|b| b.data.as_ref())
        .and_then(|d| d.id.as_deref())
        .and_then(|id| id.split_once('_'))
        .map(|(_, mint)| mint)?;
    let address = TokenAddress::parse(mint).ok()?;

    let price_usd = attrs
        .base_token_price_usd
        .as_ref()
        .and_then(RawNumber::as_f64)?;

    let name = attrs.name.unwrap_or_default();
    let ticker = base_leg(&name);

    let transactions = attrs
        .transactions
        .and_then(|t| t.h24)
        .map(|w| w.buys.unwrap_or(0) + w.sells.unwrap_or(0))
        .unwrap_or(0);

    let protocol = pool
        .relationships
        .as_ref()
        .and_then(|r| r.dex.as_ref())
        .and_then(|d| d.data.as_ref())
        .and_then(|d| d.id.clone())
        .unwrap_or_default();

    TokenRecord::new(
        address,
        name.clone(),
        ticker,
        price_usd / SOL_PRICE_USD,
        0.0,
        attrs
            .volume_usd
            .and_then(|v| v.h24)
            .as_ref()
            .and_then(RawNumber::as_f64)
            .unwrap_or(0.0)
            / SOL_PRICE_USD,
        attrs
            .reserve_in_usd
            .as_ref()
            .and_then(RawNumber::as_f64)
            .unwrap_or(0.0)
            / SOL_PRICE_USD,
        transactions,
        attrs
            .price_change_percentage
            .and_then(|p| p.h1)
            .as_ref()
            .and_then(RawNumber::as_f64)
            .unwrap_or(0.0),
        protocol,
        SourceId::Gecko,
    )
    .ok()
}

/// Pool names read `BASE / QUOTE`; the base leg doubles as the ticker.
fn base_leg(pool_name: &str) -> String {
    pool_name
        .split_once(" / ")
        .map(|(base, _)| base)
        .unwrap_or(pool_name)
        .trim()
        .to_owned()
}

#[derive(Debug, Deserialize)]
struct PoolsResponse {
    #[serde(default)]
    data: Option<Vec<RawPool>>,
}

#[derive(Debug, Deserialize)]
struct RawPool {
    attributes: Option<RawAttributes>,
    relationships: Option<RawRelationships>,
}

#[derive(Debug, Deserialize)]
struct RawAttributes {
    name: Option<String>,
    base_token_price_usd: Option<RawNumber>,
    volume_usd: Option<RawVolumeWindow>,
    reserve_in_usd: Option<RawNumber>,
    transactions: Option<RawTransactions>,
    price_change_percentage: Option<RawChangeWindow>,
}

#[derive(Debug, Deserialize)]
struct RawVolumeWindow {
    h24: Option<RawNumber>,
}

#[derive(Debug, Deserialize)]
struct RawTransactions {
    h24: Option<RawTxnWindow>,
}

#[derive(Debug, Deserialize)]
struct RawTxnWindow {
    buys: Option<u64>,
    sells: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawChangeWindow {
    h1: Option<RawNumber>,
}

#[derive(Debug, Deserialize)]
struct RawRelationships {
    base_token: Option<RawRelation>,
    dex: Option<RawRelation>,
}

#[derive(Debug, Deserialize)]
struct RawRelation {
    data: Option<RawRelationData>,
}

#[derive(Debug, Deserialize)]
struct RawRelationData {
    id: Option<String>,
}
