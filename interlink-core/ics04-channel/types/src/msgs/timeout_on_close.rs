use interlink_core_client_types::Height;
use interlink_core_commitment_types::commitment::CommitmentProofBytes;
use interlink_core_host_types::identifiers::Sequence;
use interlink_primitives::Signer;

use crate::packet::Packet;

///
/// Message definition for packet timeout domain type.
///
/// Sent on chain A when chain B closed the channel before receiving the
/// packet; it proves the closure instead of an elapsed timeout.
/// `counterparty_upgrade_sequence` is the upgrade sequence of the closed
/// channel end on chain B.
///
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgTimeoutOnClose {
    pub packet: Packet,
    pub next_seq_recv_on_b: Sequence,
    pub proof_unreceived_on_b: CommitmentProofBytes,
    pub proof_close_on_b: CommitmentProofBytes,
    pub proof_height_on_b: Height,
    pub counterparty_upgrade_sequence: u64,
    pub signer: Signer,
}
