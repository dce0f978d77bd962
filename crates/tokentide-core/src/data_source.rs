//! Source adapter contract and its error taxonomy.
//!
//! Every provider implements [`TokenSource`]: no input, an ordered batch of
//! canonical records out. Errors are classified so the aggregator can log
//! rate limiting distinctly, but every error is handled identically at the
//! fan-out boundary: the batch degrades to empty and the cycle continues.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{SourceId, TokenRecord};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Transport,
    RateLimited,
    MalformedResponse,
    Internal,
}

/// Structured source error surfaced to the aggregator's fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedResponse,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether a later cycle could plausibly succeed. Purely informational:
    /// nothing retries within a cycle, the next poll is the retry.
    pub const fn retryable(&self) -> bool {
        matches!(
            self.kind,
            SourceErrorKind::Transport | SourceErrorKind::RateLimited
        )
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::MalformedResponse => "source.malformed_response",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Provider adapter contract.
///
/// `fetch` returns the provider's current token list in fetch order, fully
/// normalized; records that cannot produce identity and price have already
/// been dropped. Implementations must be `Send + Sync` since they are
/// shared across the poller and request handlers.
pub trait TokenSource: Send + Sync {
    /// Unique provider identifier; also the merge registration tag.
    fn id(&self) -> SourceId;

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<TokenRecord>, SourceError>> + Send + 'a>>;
}
