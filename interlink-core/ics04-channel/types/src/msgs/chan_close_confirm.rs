use interlink_core_client_types::Height;
use interlink_core_commitment_types::commitment::CommitmentProofBytes;
use interlink_core_host_types::identifiers::{ChannelId, PortId};
use interlink_primitives::Signer;

///
/// Message definition for the second step in the channel close handshake (`ChanCloseConfirm`
/// datagram).
/// Per our convention, this message is sent to chain B.
///
/// `counterparty_upgrade_sequence` is the upgrade sequence of the closed
/// channel end on chain A, which is part of the proven value.
///
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelCloseConfirm {
    pub port_id_on_b: PortId,
    pub chan_id_on_b: ChannelId,
    pub proof_chan_end_on_a: CommitmentProofBytes,
    pub proof_height_on_a: Height,
    pub counterparty_upgrade_sequence: u64,
    pub signer: Signer,
}
