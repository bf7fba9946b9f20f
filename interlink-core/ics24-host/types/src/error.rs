//! Error types raised by hosts and by identifier parsing.

use displaydoc::Display;
use interlink_primitives::prelude::*;

/// Errors that originate from host implementations.
#[derive(Debug, Display)]
pub enum HostError {
    /// missing data: `{description}`
    MissingData { description: String },
    /// failed to store data: `{description}`
    FailedToStoreData { description: String },
    /// capability for `{path}` is already claimed
    CapabilityAlreadyClaimed { path: String },
    /// capability for `{path}` not found
    CapabilityNotFound { path: String },
    /// capability does not authenticate `{path}`
    CapabilityNotAuthenticated { path: String },
    /// invalid signer: `{description}`
    InvalidSigner { description: String },
    /// other error: `{description}`
    Other { description: String },
}

impl HostError {
    pub fn missing_data(description: impl ToString) -> Self {
        Self::MissingData {
            description: description.to_string(),
        }
    }
}

/// Errors that arise when parsing identifiers.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Display, PartialEq, Eq)]
pub enum IdentifierError {
    /// id `{id}` has invalid length; must be between [`{min}`,`{max}`]
    InvalidLength { id: String, min: u64, max: u64 },
    /// id `{id}` can only contain alphanumeric characters or `.`, `_`, `+`, `-`, `#`, `[`, `]`, `<`, `>`
    InvalidCharacter { id: String },
    /// id `{id}` is not of the form `{prefix}-<counter>`
    InvalidPrefix { id: String, prefix: String },
    /// failed to parse `{value}` as a sequence: `{description}`
    InvalidSequence { value: String, description: String },
}

/// Errors that occur while converting raw values into domain types.
#[derive(Debug, Display)]
pub enum DecodingError {
    /// identifier error: `{0}`
    Identifier(IdentifierError),
    /// invalid raw data: `{description}`
    InvalidRawData { description: String },
    /// missing raw data: `{description}`
    MissingRawData { description: String },
}

impl From<IdentifierError> for DecodingError {
    fn from(e: IdentifierError) -> Self {
        Self::Identifier(e)
    }
}

impl DecodingError {
    pub fn missing_raw_data(description: impl ToString) -> Self {
        Self::MissingRawData {
            description: description.to_string(),
        }
    }

    pub fn invalid_raw_data(description: impl ToString) -> Self {
        Self::InvalidRawData {
            description: description.to_string(),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HostError {}

#[cfg(feature = "std")]
impl std::error::Error for IdentifierError {}

#[cfg(feature = "std")]
impl std::error::Error for DecodingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Identifier(e) => Some(e),
            _ => None,
        }
    }
}
