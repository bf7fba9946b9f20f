use interlink_core_channel_types::channel::ChannelEnd;
use interlink_core_channel_types::commitment::{AcknowledgementCommitment, PacketCommitment};
use interlink_core_channel_types::packet::Receipt;
use interlink_core_channel_types::upgrade::{ErrorReceipt, Upgrade};
use interlink_core_client_types::Height;
use interlink_core_connection_types::ConnectionEnd;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::IbcEvent;
use interlink_core_host_types::capability::Capability;
use interlink_core_host_types::identifiers::{ConnectionId, Sequence};
use interlink_core_host_types::path::{
    AckPath, ChannelCapabilityPath, ChannelEndPath, ChannelUpgradePath, CommitmentPath,
    CounterpartyUpgradePath, ReceiptPath, SeqAckPath, SeqRecvPath, SeqSendPath, UpgradeErrorPath,
};
use interlink_primitives::prelude::*;
use interlink_primitives::{Signer, Timestamp};

use crate::verifier::ProofVerifier;

/// Context to be implemented by the host that provides all "read-only" methods.
///
/// Trait used for the top-level `validate` entrypoint in the `interlink-core` crate.
pub trait ValidationContext {
    /// The proof verifier bridging to the host's light clients.
    type Verifier: ProofVerifier;

    /// Retrieve the verifier used to check counterparty proofs.
    fn proof_verifier(&self) -> &Self::Verifier;

    /// Returns the current height of the local chain.
    fn host_height(&self) -> Result<Height, ContextError>;

    /// Returns the current timestamp of the local chain.
    fn host_timestamp(&self) -> Result<Timestamp, ContextError>;

    /// Returns the ConnectionEnd for the given identifier `conn_id`.
    fn connection_end(&self, conn_id: &ConnectionId) -> Result<ConnectionEnd, ContextError>;

    /// Returns the `ChannelEnd` for the given `port_id` and `chan_id`.
    fn channel_end(&self, channel_end_path: &ChannelEndPath) -> Result<ChannelEnd, ContextError>;

    /// Returns the sequence number for the next packet to be sent for the given store path
    fn get_next_sequence_send(&self, seq_send_path: &SeqSendPath)
        -> Result<Sequence, ContextError>;

    /// Returns the sequence number for the next packet to be received for the given store path
    fn get_next_sequence_recv(&self, seq_recv_path: &SeqRecvPath)
        -> Result<Sequence, ContextError>;

    /// Returns the sequence number for the next packet to be acknowledged for the given store path
    fn get_next_sequence_ack(&self, seq_ack_path: &SeqAckPath) -> Result<Sequence, ContextError>;

    /// Returns the packet commitment for the given store path, failing with
    /// `PacketError::PacketCommitmentNotFound` if there is none.
    fn get_packet_commitment(
        &self,
        commitment_path: &CommitmentPath,
    ) -> Result<PacketCommitment, ContextError>;

    /// Returns the sequences of all packet commitments still stored for a
    /// channel, in ascending order.
    fn packet_commitment_sequences(
        &self,
        channel_end_path: &ChannelEndPath,
    ) -> Result<Vec<Sequence>, ContextError>;

    /// Returns the packet receipt for the given store path, `Receipt::None`
    /// if the packet was never received.
    fn get_packet_receipt(&self, receipt_path: &ReceiptPath) -> Result<Receipt, ContextError>;

    /// Returns the packet acknowledgement for the given store path, failing
    /// with `HostError::MissingData` if there is none.
    fn get_packet_acknowledgement(
        &self,
        ack_path: &AckPath,
    ) -> Result<AcknowledgementCommitment, ContextError>;

    /// Returns a counter on the number of channel ids have been created thus far.
    /// The value of this counter should increase only via method
    /// `ExecutionContext::increase_channel_counter`.
    fn channel_counter(&self) -> Result<u64, ContextError>;

    /// Returns the upgrade in progress on a channel, if any.
    fn channel_upgrade(
        &self,
        upgrade_path: &ChannelUpgradePath,
    ) -> Result<Option<Upgrade>, ContextError>;

    /// Returns the counterparty upgrade learnt during the upgrade handshake,
    /// if any.
    fn counterparty_upgrade(
        &self,
        upgrade_path: &CounterpartyUpgradePath,
    ) -> Result<Option<Upgrade>, ContextError>;

    /// Returns the last error receipt written for a channel, if any.
    fn upgrade_error_receipt(
        &self,
        error_path: &UpgradeErrorPath,
    ) -> Result<Option<ErrorReceipt>, ContextError>;

    /// Returns the capability claimed for the channel, if any.
    fn get_capability(&self, capability_path: &ChannelCapabilityPath) -> Option<Capability>;

    /// Checks that `capability` is the one claimed for the channel.
    fn authenticate_capability(
        &self,
        capability: &Capability,
        capability_path: &ChannelCapabilityPath,
    ) -> bool;

    /// Validates the `signer` field of messages, which represents the address
    /// of the user/relayer that signed the given message.
    fn validate_message_signer(&self, signer: &Signer) -> Result<(), ContextError>;
}

/// Context to be implemented by the host that provides all "write-only" methods.
///
/// Trait used for the top-level `execute` and `dispatch` entrypoints in the `interlink-core` crate.
pub trait ExecutionContext: ValidationContext {
    /// Stores the given packet commitment at the given store path
    fn store_packet_commitment(
        &mut self,
        commitment_path: &CommitmentPath,
        commitment: PacketCommitment,
    ) -> Result<(), ContextError>;

    /// Deletes the packet commitment at the given store path
    fn delete_packet_commitment(
        &mut self,
        commitment_path: &CommitmentPath,
    ) -> Result<(), ContextError>;

    /// Stores the given packet receipt at the given store path
    fn store_packet_receipt(
        &mut self,
        receipt_path: &ReceiptPath,
        receipt: Receipt,
    ) -> Result<(), ContextError>;

    /// Stores the given packet acknowledgement at the given store path
    fn store_packet_acknowledgement(
        &mut self,
        ack_path: &AckPath,
        ack_commitment: AcknowledgementCommitment,
    ) -> Result<(), ContextError>;

    /// Stores the given channel_end at a path associated with the port_id and channel_id.
    fn store_channel(
        &mut self,
        channel_end_path: &ChannelEndPath,
        channel_end: ChannelEnd,
    ) -> Result<(), ContextError>;

    /// Stores the given `nextSequenceSend` number at the given store path
    fn store_next_sequence_send(
        &mut self,
        seq_send_path: &SeqSendPath,
        seq: Sequence,
    ) -> Result<(), ContextError>;

    /// Stores the given `nextSequenceRecv` number at the given store path
    fn store_next_sequence_recv(
        &mut self,
        seq_recv_path: &SeqRecvPath,
        seq: Sequence,
    ) -> Result<(), ContextError>;

    /// Stores the given `nextSequenceAck` number at the given store path
    fn store_next_sequence_ack(
        &mut self,
        seq_ack_path: &SeqAckPath,
        seq: Sequence,
    ) -> Result<(), ContextError>;

    /// Called upon channel identifier creation (Init or Try message processing).
    /// Increases the counter which keeps track of how many channels have been created.
    /// Should never fail.
    fn increase_channel_counter(&mut self) -> Result<(), ContextError>;

    fn store_channel_upgrade(
        &mut self,
        upgrade_path: &ChannelUpgradePath,
        upgrade: Upgrade,
    ) -> Result<(), ContextError>;

    fn delete_channel_upgrade(&mut self, upgrade_path: &ChannelUpgradePath)
        -> Result<(), ContextError>;

    fn store_counterparty_upgrade(
        &mut self,
        upgrade_path: &CounterpartyUpgradePath,
        upgrade: Upgrade,
    ) -> Result<(), ContextError>;

    fn delete_counterparty_upgrade(
        &mut self,
        upgrade_path: &CounterpartyUpgradePath,
    ) -> Result<(), ContextError>;

    /// Stores the error receipt of an aborted upgrade, replacing any older one.
    fn store_upgrade_error_receipt(
        &mut self,
        error_path: &UpgradeErrorPath,
        error_receipt: ErrorReceipt,
    ) -> Result<(), ContextError>;

    /// Claims the capability for a freshly created channel. Fails if the
    /// path is already claimed.
    fn claim_capability(
        &mut self,
        capability_path: &ChannelCapabilityPath,
    ) -> Result<Capability, ContextError>;

    /// Releases a previously claimed capability, so that the path can be
    /// claimed again.
    fn release_capability(
        &mut self,
        capability_path: &ChannelCapabilityPath,
        capability: Capability,
    ) -> Result<(), ContextError>;

    /// Emit the given event
    fn emit_ibc_event(&mut self, event: IbcEvent) -> Result<(), ContextError>;

    /// Log the given message.
    fn log_message(&mut self, message: String) -> Result<(), ContextError>;
}
