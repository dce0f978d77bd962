//! Read-side sorting and cursor pagination over a snapshot.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{AggregatedToken, Snapshot};
use crate::ValidationError;

/// Page size applied when a query names none.
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Sortable numeric fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Volume,
    #[serde(rename = "price_change_1h")]
    PriceChange1h,
    MarketCap,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::PriceChange1h => "price_change_1h",
            Self::MarketCap => "market_cap",
        }
    }

    /// Sort value for one token. Non-finite values sort as zero so a single
    /// bad figure cannot poison the ordering.
    fn value(&self, token: &AggregatedToken) -> f64 {
        let raw = match self {
            Self::Volume => token.volume_sol,
            Self::PriceChange1h => token.price_change_1h,
            Self::MarketCap => token.market_cap_sol,
        };
        if raw.is_finite() {
            raw
        } else {
            0.0
        }
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "volume" => Ok(Self::Volume),
            "price_change_1h" => Ok(Self::PriceChange1h),
            "market_cap" => Ok(Self::MarketCap),
            _ => Err(ValidationError::InvalidSortKey {
                value: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ValidationError::InvalidSortOrder {
                value: s.to_owned(),
            }),
        }
    }
}

/// One query against the current snapshot. Every field is optional; an
/// empty query returns the first page in snapshot order.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    pub sort_by: Option<SortKey>,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

// The serde attribute only covers deserialization, so `Default` must fill
// in the page limit itself.
impl Default for TokenQuery {
    fn default() -> Self {
        Self {
            sort_by: None,
            order: SortOrder::default(),
            cursor: None,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

/// One page of results plus the cursor for the next page. `next_cursor`
/// is present whenever the page is full, including when the full page is
/// also the last one.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPage {
    pub tokens: Vec<AggregatedToken>,
    pub next_cursor: Option<String>,
}

/// Sort then paginate the snapshot per the query.
pub fn apply(snapshot: &Snapshot, query: &TokenQuery) -> TokenPage {
    let mut tokens = snapshot.tokens.clone();
    sort_tokens(&mut tokens, query.sort_by, query.order);
    paginate(tokens, query.cursor.as_deref(), query.limit)
}

/// Stable sort; equal keys keep snapshot order. No key means no sort.
fn sort_tokens(tokens: &mut [AggregatedToken], key: Option<SortKey>, order: SortOrder) {
    let Some(key) = key else {
        return;
    };
    tokens.sort_by(|a, b| {
        let ordering = key.value(a).total_cmp(&key.value(b));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Slice one page out of the sorted list. An unknown cursor starts from
/// the beginning rather than erroring, since tokens can drop out of the
/// set between refreshes.
fn paginate(tokens: Vec<AggregatedToken>, cursor: Option<&str>, limit: usize) -> TokenPage {
    let start = cursor
        .and_then(|c| tokens.iter().position(|t| t.address.as_str() == c))
        .map(|position| position + 1)
        .unwrap_or(0);

    let page: Vec<AggregatedToken> = tokens.into_iter().skip(start).take(limit).collect();

    let next_cursor = if !page.is_empty() && page.len() == limit {
        page.last().map(|t| t.address.as_str().to_owned())
    } else {
        None
    };

    TokenPage {
        tokens: page,
        next_cursor,
    }
}
