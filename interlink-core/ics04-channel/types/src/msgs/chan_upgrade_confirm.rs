use interlink_core_client_types::Height;
use interlink_core_commitment_types::commitment::CommitmentProofBytes;
use interlink_core_host_types::identifiers::{ChannelId, PortId};
use interlink_primitives::Signer;

use crate::channel::State;
use crate::upgrade::Upgrade;

/// Tells chain B that chain A is flushing under the agreed upgrade.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelUpgradeConfirm {
    pub port_id_on_b: PortId,
    pub chan_id_on_b: ChannelId,
    pub counterparty_chan_state: State,
    pub counterparty_upgrade: Upgrade,
    pub proof_chan_end_on_a: CommitmentProofBytes,
    pub proof_upgrade_on_a: CommitmentProofBytes,
    pub proof_height_on_a: Height,
    pub signer: Signer,
}
