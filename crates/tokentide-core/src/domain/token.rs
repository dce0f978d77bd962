use serde::{Deserialize, Serialize};

use crate::{SourceId, TokenAddress, UtcTimestamp, ValidationError};

/// Canonical, normalized representation of one token as reported by one
/// provider.
///
/// Identity and price are always present; the constructor rejects records
/// that cannot satisfy that, so nothing downstream of normalization ever
/// sees a partial record. All other numeric fields default to zero when a
/// provider omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub address: TokenAddress,
    pub name: String,
    pub ticker: String,
    pub price_sol: f64,
    pub market_cap_sol: f64,
    pub volume_sol: f64,
    pub liquidity_sol: f64,
    pub transaction_count: u64,
    pub price_change_1h: f64,
    pub protocol: String,
    pub source: SourceId,
}

impl TokenRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        address: TokenAddress,
        name: impl Into<String>,
        ticker: impl Into<String>,
        price_sol: f64,
        market_cap_sol: f64,
        volume_sol: f64,
        liquidity_sol: f64,
        transaction_count: u64,
        price_change_1h: f64,
        protocol: impl Into<String>,
        source: SourceId,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price_sol", price_sol)?;
        validate_non_negative("market_cap_sol", market_cap_sol)?;
        validate_non_negative("volume_sol", volume_sol)?;
        validate_non_negative("liquidity_sol", liquidity_sol)?;
        validate_finite("price_change_1h", price_change_1h)?;

        Ok(Self {
            address,
            name: name.into(),
            ticker: ticker.into(),
            price_sol,
            market_cap_sol,
            volume_sol,
            liquidity_sol,
            transaction_count,
            price_change_1h,
            protocol: protocol.into(),
            source,
        })
    }
}

/// Merged, multi-source representation of one token: a [`TokenRecord`] with
/// the single source tag replaced by the ordered list of contributing
/// sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedToken {
    pub address: TokenAddress,
    pub name: String,
    pub ticker: String,
    pub price_sol: f64,
    pub market_cap_sol: f64,
    pub volume_sol: f64,
    pub liquidity_sol: f64,
    pub transaction_count: u64,
    pub price_change_1h: f64,
    pub protocol: String,
    pub sources: Vec<SourceId>,
}

impl AggregatedToken {
    /// Promote a single-source record; its source becomes the first tag.
    pub fn from_record(record: TokenRecord) -> Self {
        Self {
            address: record.address,
            name: record.name,
            ticker: record.ticker,
            price_sol: record.price_sol,
            market_cap_sol: record.market_cap_sol,
            volume_sol: record.volume_sol,
            liquidity_sol: record.liquidity_sol,
            transaction_count: record.transaction_count,
            price_change_1h: record.price_change_1h,
            protocol: record.protocol,
            sources: vec![record.source],
        }
    }

    /// Append a contributing source tag. Tags already present are ignored,
    /// keeping the no-duplicates invariant even when a single provider
    /// reports the same mint twice.
    pub fn push_source(&mut self, source: SourceId) {
        if !self.sources.contains(&source) {
            self.sources.push(source);
        }
    }
}

/// One immutable, complete merged result set produced by a single refresh
/// cycle. Superseded by the next cycle's snapshot, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tokens: Vec<AggregatedToken>,
    pub generated_at: UtcTimestamp,
}

impl Snapshot {
    pub fn new(tokens: Vec<AggregatedToken>) -> Self {
        Self {
            tokens,
            generated_at: UtcTimestamp::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
