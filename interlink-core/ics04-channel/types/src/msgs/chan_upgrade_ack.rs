use interlink_core_client_types::Height;
use interlink_core_commitment_types::commitment::CommitmentProofBytes;
use interlink_core_host_types::identifiers::{ChannelId, PortId};
use interlink_primitives::Signer;

use crate::upgrade::Upgrade;

/// Tells chain A that chain B accepted its upgrade and started flushing.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelUpgradeAck {
    pub port_id_on_a: PortId,
    pub chan_id_on_a: ChannelId,
    pub counterparty_upgrade: Upgrade,
    pub proof_chan_end_on_b: CommitmentProofBytes,
    pub proof_upgrade_on_b: CommitmentProofBytes,
    pub proof_height_on_b: Height,
    pub signer: Signer,
}
