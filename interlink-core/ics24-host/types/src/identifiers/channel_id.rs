use core::str::FromStr;

use derive_more::{Display, Into};
use interlink_primitives::prelude::*;

use crate::error::IdentifierError;
use crate::validate::validate_channel_identifier;

const CHANNEL_ID_PREFIX: &str = "channel";

/// Identifies a channel end on the host. The host hands these out in
/// allocation order, as `channel-{counter}`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Into)]
pub struct ChannelId(String);

impl ChannelId {
    /// ```
    /// # use interlink_core_host_types::identifiers::ChannelId;
    /// let chan_id = ChannelId::new(27);
    /// assert_eq!(chan_id.to_string(), "channel-27");
    /// assert_eq!(chan_id.counter(), Some(27));
    /// ```
    pub fn new(counter: u64) -> Self {
        Self(format!("{CHANNEL_ID_PREFIX}-{counter}"))
    }

    /// The first channel a host allocates.
    pub fn zero() -> Self {
        Self::new(0)
    }

    pub fn prefix() -> &'static str {
        CHANNEL_ID_PREFIX
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value of the host's channel counter this identifier was allocated
    /// from, if it follows the `channel-{counter}` layout.
    pub fn counter(&self) -> Option<u64> {
        self.0
            .strip_prefix(CHANNEL_ID_PREFIX)?
            .strip_prefix('-')?
            .parse()
            .ok()
    }
}

impl FromStr for ChannelId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_channel_identifier(s)?;
        Ok(Self(s.to_string()))
    }
}

impl PartialEq<str> for ChannelId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for ChannelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
