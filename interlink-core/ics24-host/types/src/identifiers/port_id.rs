use core::str::FromStr;

use derive_more::{Display, Into};
use interlink_primitives::prelude::*;

use crate::error::IdentifierError;
use crate::validate::validate_port_identifier;

/// Identifies the application module bound to one end of a channel.
///
/// Unlike channel ids, ports are chosen by the application and carry no
/// counter.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Into)]
pub struct PortId(String);

impl PortId {
    pub fn new(id: String) -> Result<Self, IdentifierError> {
        validate_port_identifier(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Re-checks an identifier that did not go through [`PortId::new`], as
    /// one decoded with serde.
    pub fn validate(&self) -> Result<(), IdentifierError> {
        validate_port_identifier(&self.0)
    }
}

impl FromStr for PortId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl AsRef<str> for PortId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
