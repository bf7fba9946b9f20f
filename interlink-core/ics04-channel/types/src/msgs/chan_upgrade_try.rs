use interlink_core_client_types::Height;
use interlink_core_commitment_types::commitment::CommitmentProofBytes;
use interlink_core_host_types::identifiers::{ChannelId, ConnectionId, PortId};
use interlink_primitives::prelude::*;
use interlink_primitives::Signer;

use crate::channel::verify_connection_hops_length;
use crate::error::UpgradeError;
use crate::upgrade::{UpgradeFields, UpgradeTimeout};

/// Answers an upgrade proposed by chain A. Sent to chain B.
///
/// Carries A's proposal together with proofs that A's channel is in
/// `InitUpgrade` at `counterparty_upgrade_sequence` and stores that proposal.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelUpgradeTry {
    pub port_id_on_b: PortId,
    pub chan_id_on_b: ChannelId,
    /// The connection B uses to reach the connection A proposed.
    pub proposed_connection_hops: Vec<ConnectionId>,
    pub counterparty_upgrade_fields: UpgradeFields,
    pub counterparty_upgrade_timeout: UpgradeTimeout,
    pub counterparty_upgrade_sequence: u64,
    pub proof_chan_end_on_a: CommitmentProofBytes,
    pub proof_upgrade_on_a: CommitmentProofBytes,
    pub proof_height_on_a: Height,
    pub signer: Signer,
}

impl MsgChannelUpgradeTry {
    pub fn validate_basic(&self) -> Result<(), UpgradeError> {
        verify_connection_hops_length(&self.proposed_connection_hops, 1).map_err(|e| {
            UpgradeError::InvalidUpgradeFields {
                description: e.to_string(),
            }
        })?;

        self.counterparty_upgrade_fields.validate_basic()
    }
}
