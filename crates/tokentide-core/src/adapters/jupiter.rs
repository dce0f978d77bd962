//! Jupiter adapter: token listings with price only, the thinnest provider.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::adapters::SOL_PRICE_USD;
use crate::data_source::{SourceError, TokenSource};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{SourceId, TokenAddress, TokenRecord};

const DEFAULT_ENDPOINT: &str = "https://api.jup.ag/v6/token-list";
const FETCH_TIMEOUT_MS: u64 = 10_000;

/// Fetches the Jupiter token list. Jupiter carries no volume, liquidity or
/// transaction figures; those fields normalize to zero.
pub struct JupiterSource {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
}

impl JupiterSource {
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

    async fn fetch_listings(&self) -> Result<Vec<TokenRecord>, SourceError> {
        let request = HttpRequest::get(&self.endpoint)
            .with_header("accept", "application/json")
            .with_timeout_ms(FETCH_TIMEOUT_MS);

        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::transport(format!("jupiter transport error: {}", e.message()))
        })?;

        if response.is_rate_limited() {
            return Err(SourceError::rate_limited("jupiter rate limited (429)"));
        }
        if !response.is_success() {
            return Err(SourceError::transport(format!(
                "jupiter returned status {}",
                response.status
            )));
        }

        let payload: ListResponse = serde_json::from_str(&response.body)
            .map_err(|e| SourceError::malformed(format!("failed to parse jupiter response: {e}")))?;

        let tokens: Vec<TokenRecord> = payload
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(normalize_listing)
            .collect();

        debug!(count = tokens.len(), "jupiter batch normalized");
        Ok(tokens)
    }
}

impl TokenSource for JupiterSource {
    fn id(&self) -> SourceId {
        SourceId::Jupiter
    }

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<TokenRecord>, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_listings())
    }
}

fn normalize_listing(listing: RawListing) -> Option<TokenRecord> {
    let address = TokenAddress::parse(&listing.address?).ok()?;

    TokenRecord::new(
        address,
        listing.name.unwrap_or_default(),
        listing.symbol.unwrap_or_default(),
        listing.price.unwrap_or(0.0) / SOL_PRICE_USD,
        0.0,
        0.0,
        0.0,
        0,
        0.0,
        "Jupiter".to_owned(),
        SourceId::Jupiter,
    )
    .ok()
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Option<Vec<RawListing>>,
}

#[derive(Debug, Deserialize)]
struct RawListing {
    address: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    price: Option<f64>,
}
