use core::str::FromStr;

use derive_more::{Display, Into};
use interlink_primitives::prelude::*;

use crate::error::IdentifierError;
use crate::validate::validate_client_identifier;

/// Identifies the light client a connection verifies counterparty proofs
/// with, e.g. `07-tendermint-0`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Into, Display)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(client_type: &str, counter: u64) -> Result<Self, IdentifierError> {
        format!("{client_type}-{counter}").parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ClientId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_client_identifier(s).map(|_| Self(s.to_string()))
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
