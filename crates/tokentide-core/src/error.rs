use thiserror::Error;

/// Validation and contract errors exposed by `tokentide-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("token address cannot be empty")]
    EmptyAddress,
    #[error("token address length {len} exceeds max {max}")]
    AddressTooLong { len: usize, max: usize },
    #[error("token address contains invalid character '{ch}' at index {index}")]
    AddressInvalidChar { ch: char, index: usize },

    #[error("invalid source '{value}', expected one of dexscreener, gecko, jupiter")]
    InvalidSource { value: String },

    #[error("invalid sort key '{value}', expected one of volume, price_change_1h, market_cap")]
    InvalidSortKey { value: String },
    #[error("invalid sort order '{value}', expected asc or desc")]
    InvalidSortOrder { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
