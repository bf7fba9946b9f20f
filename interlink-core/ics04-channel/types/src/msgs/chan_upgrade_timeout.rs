use interlink_core_client_types::Height;
use interlink_core_commitment_types::commitment::CommitmentProofBytes;
use interlink_core_host_types::identifiers::{ChannelId, PortId};
use interlink_primitives::Signer;

use crate::channel::ChannelEnd;

/// Aborts a local upgrade by proving that the counterparty passed the
/// upgrade timeout without completing its side.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelUpgradeTimeout {
    pub port_id: PortId,
    pub chan_id: ChannelId,
    pub counterparty_channel: ChannelEnd,
    pub proof_chan_end_on_cp: CommitmentProofBytes,
    pub proof_height_on_cp: Height,
    pub signer: Signer,
}
