use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical provider identifiers, one per registered market-data source.
///
/// The order of [`SourceId::ALL`] is the registration order used by the
/// merger: the first source that produces a given token address is
/// authoritative for its non-source fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Dexscreener,
    Gecko,
    Jupiter,
}

impl SourceId {
    /// Registration order; DexScreener is the primary source.
    pub const ALL: [Self; 3] = [Self::Dexscreener, Self::Gecko, Self::Jupiter];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dexscreener => "dexscreener",
            Self::Gecko => "gecko",
            Self::Jupiter => "jupiter",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dexscreener" => Ok(Self::Dexscreener),
            "gecko" => Ok(Self::Gecko),
            "jupiter" => Ok(Self::Jupiter),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}
