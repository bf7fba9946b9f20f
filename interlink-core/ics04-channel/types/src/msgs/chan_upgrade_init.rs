use interlink_core_host_types::identifiers::{ChannelId, PortId};
use interlink_primitives::Signer;

use crate::error::UpgradeError;
use crate::upgrade::{UpgradeFields, UpgradeTimeout};

/// Opens an upgrade on chain A by proposing new channel parameters.
///
/// The timeout proposed here is the one both ends enforce for the whole
/// upgrade attempt.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelUpgradeInit {
    pub port_id_on_a: PortId,
    pub chan_id_on_a: ChannelId,
    pub fields: UpgradeFields,
    pub timeout: UpgradeTimeout,
    pub signer: Signer,
}

impl MsgChannelUpgradeInit {
    pub fn validate_basic(&self) -> Result<(), UpgradeError> {
        self.fields.validate_basic()?;

        if !self.timeout.is_set() {
            return Err(UpgradeError::InvalidUpgradeTimeout);
        }

        Ok(())
    }
}
