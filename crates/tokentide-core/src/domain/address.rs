use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Solana mint addresses are base-58 and never longer than 44 characters.
const MAX_ADDRESS_LEN: usize = 44;

/// Validated token identity: the mint address that distinguishes one token
/// across all sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenAddress(String);

impl TokenAddress {
    /// Parse and validate a mint address against the base-58 alphabet.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyAddress);
        }

        let len = trimmed.chars().count();
        if len > MAX_ADDRESS_LEN {
            return Err(ValidationError::AddressTooLong {
                len,
                max: MAX_ADDRESS_LEN,
            });
        }

        for (index, ch) in trimmed.chars().enumerate() {
            // Base-58 excludes 0, O, I and l to avoid visual ambiguity.
            let valid = ch.is_ascii_alphanumeric() && !matches!(ch, '0' | 'O' | 'I' | 'l');
            if !valid {
                return Err(ValidationError::AddressInvalidChar { ch, index });
            }
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TokenAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for TokenAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for TokenAddress {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TokenAddress> for String {
    fn from(value: TokenAddress) -> Self {
        value.0
    }
}
