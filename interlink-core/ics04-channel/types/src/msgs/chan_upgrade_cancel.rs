use interlink_core_client_types::Height;
use interlink_core_commitment_types::commitment::CommitmentProofBytes;
use interlink_core_host_types::identifiers::{ChannelId, PortId};
use interlink_primitives::Signer;

use crate::upgrade::ErrorReceipt;

/// Cancels a local upgrade after proving the counterparty aborted it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelUpgradeCancel {
    pub port_id: PortId,
    pub chan_id: ChannelId,
    pub error_receipt: ErrorReceipt,
    pub proof_error_receipt: CommitmentProofBytes,
    pub proof_height: Height,
    pub signer: Signer,
}
