//! Channel context used by applications that send packets.

use interlink_core_channel_types::channel::ChannelEnd;
use interlink_core_channel_types::commitment::PacketCommitment;
use interlink_core_client_types::error::ClientError;
use interlink_core_client_types::Height;
use interlink_core_connection_types::ConnectionEnd;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::IbcEvent;
use interlink_core_host::types::capability::Capability;
use interlink_core_host::types::identifiers::{ClientId, ConnectionId, Sequence};
use interlink_core_host::types::path::{
    ChannelCapabilityPath, ChannelEndPath, CommitmentPath, SeqSendPath,
};
use interlink_core_host::{ExecutionContext, ProofVerifier, ValidationContext};
use interlink_primitives::prelude::*;
use interlink_primitives::Timestamp;

/// Methods required in send packet validation, to be implemented by the host
pub trait SendPacketValidationContext {
    /// Returns the ChannelEnd for the given `port_id` and `chan_id`.
    fn channel_end(&self, channel_end_path: &ChannelEndPath) -> Result<ChannelEnd, ContextError>;

    /// Returns the ConnectionState for the given identifier `connection_id`.
    fn connection_end(&self, connection_id: &ConnectionId) -> Result<ConnectionEnd, ContextError>;

    /// Latest height of the counterparty known to the client `client_id`.
    fn client_latest_height(&self, client_id: &ClientId) -> Result<Height, ClientError>;

    /// Counterparty block time recorded by the client `client_id` at `height`.
    fn client_consensus_timestamp(
        &self,
        client_id: &ClientId,
        height: &Height,
    ) -> Result<Timestamp, ClientError>;

    fn get_next_sequence_send(&self, seq_send_path: &SeqSendPath)
        -> Result<Sequence, ContextError>;

    fn authenticate_capability(
        &self,
        capability: &Capability,
        capability_path: &ChannelCapabilityPath,
    ) -> bool;
}

impl<T> SendPacketValidationContext for T
where
    T: ValidationContext,
{
    fn channel_end(&self, channel_end_path: &ChannelEndPath) -> Result<ChannelEnd, ContextError> {
        self.channel_end(channel_end_path)
    }

    fn connection_end(&self, connection_id: &ConnectionId) -> Result<ConnectionEnd, ContextError> {
        self.connection_end(connection_id)
    }

    fn client_latest_height(&self, client_id: &ClientId) -> Result<Height, ClientError> {
        self.proof_verifier().latest_height(client_id)
    }

    fn client_consensus_timestamp(
        &self,
        client_id: &ClientId,
        height: &Height,
    ) -> Result<Timestamp, ClientError> {
        self.proof_verifier().consensus_timestamp(client_id, height)
    }

    fn get_next_sequence_send(
        &self,
        seq_send_path: &SeqSendPath,
    ) -> Result<Sequence, ContextError> {
        self.get_next_sequence_send(seq_send_path)
    }

    fn authenticate_capability(
        &self,
        capability: &Capability,
        capability_path: &ChannelCapabilityPath,
    ) -> bool {
        self.authenticate_capability(capability, capability_path)
    }
}

/// Methods required in send packet execution, to be implemented by the host
pub trait SendPacketExecutionContext: SendPacketValidationContext {
    fn store_next_sequence_send(
        &mut self,
        seq_send_path: &SeqSendPath,
        seq: Sequence,
    ) -> Result<(), ContextError>;

    fn store_packet_commitment(
        &mut self,
        commitment_path: &CommitmentPath,
        commitment: PacketCommitment,
    ) -> Result<(), ContextError>;

    /// Ibc events
    fn emit_ibc_event(&mut self, event: IbcEvent) -> Result<(), ContextError>;

    /// Logging facility
    fn log_message(&mut self, message: String) -> Result<(), ContextError>;
}

impl<T> SendPacketExecutionContext for T
where
    T: ExecutionContext,
{
    fn store_next_sequence_send(
        &mut self,
        seq_send_path: &SeqSendPath,
        seq: Sequence,
    ) -> Result<(), ContextError> {
        self.store_next_sequence_send(seq_send_path, seq)
    }

    fn store_packet_commitment(
        &mut self,
        commitment_path: &CommitmentPath,
        commitment: PacketCommitment,
    ) -> Result<(), ContextError> {
        self.store_packet_commitment(commitment_path, commitment)
    }

    fn emit_ibc_event(&mut self, event: IbcEvent) -> Result<(), ContextError> {
        self.emit_ibc_event(event)
    }

    fn log_message(&mut self, message: String) -> Result<(), ContextError> {
        self.log_message(message)
    }
}
