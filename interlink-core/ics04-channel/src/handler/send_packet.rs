use interlink_core_channel_types::channel::Counterparty;
use interlink_core_channel_types::commitment::compute_packet_commitment;
use interlink_core_channel_types::error::{ChannelError, PacketError};
use interlink_core_channel_types::events::SendPacket;
use interlink_core_channel_types::packet::Packet;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::capability::Capability;
use interlink_core_host::types::error::HostError;
use interlink_core_host::types::path::{
    ChannelCapabilityPath, ChannelEndPath, CommitmentPath, SeqSendPath,
};
use interlink_primitives::prelude::*;

use crate::context::{SendPacketExecutionContext, SendPacketValidationContext};

/// Send the given packet, including all necessary validation.
///
/// Equivalent to calling [`send_packet_validate`], followed by [`send_packet_execute`]
pub fn send_packet(
    ctx_a: &mut impl SendPacketExecutionContext,
    capability: &Capability,
    packet: Packet,
) -> Result<(), ContextError> {
    send_packet_validate(ctx_a, capability, &packet)?;
    send_packet_execute(ctx_a, packet)
}

/// Validate that sending the given packet would succeed.
///
/// Only the holder of the channel capability may send. New packets are
/// refused once the channel answered or started flushing an upgrade.
pub fn send_packet_validate(
    ctx_a: &impl SendPacketValidationContext,
    capability: &Capability,
    packet: &Packet,
) -> Result<(), ContextError> {
    packet.validate_basic()?;

    let chan_end_path_on_a = ChannelEndPath::new(&packet.port_id_on_a, &packet.chan_id_on_a);
    let chan_end_on_a = ctx_a.channel_end(&chan_end_path_on_a)?;

    if !chan_end_on_a.state.accepts_new_packets() {
        return Err(PacketError::Channel(ChannelError::InvalidState {
            expected: "Channel state must be OPEN or INITUPGRADE".to_string(),
            actual: chan_end_on_a.state.to_string(),
        })
        .into());
    }

    let capability_path = ChannelCapabilityPath::new(&packet.port_id_on_a, &packet.chan_id_on_a);
    if !ctx_a.authenticate_capability(capability, &capability_path) {
        return Err(HostError::CapabilityNotAuthenticated {
            path: capability_path.to_string(),
        }
        .into());
    }

    let counterparty = Counterparty::new(
        packet.port_id_on_b.clone(),
        Some(packet.chan_id_on_b.clone()),
    );

    chan_end_on_a.verify_counterparty_matches(&counterparty)?;

    let conn_id_on_a = &chan_end_on_a.connection_hops()[0];

    let conn_end_on_a = ctx_a.connection_end(conn_id_on_a)?;

    let client_id_on_a = conn_end_on_a.client_id();

    let latest_height_on_a = ctx_a.client_latest_height(client_id_on_a)?;

    let latest_timestamp = ctx_a.client_consensus_timestamp(client_id_on_a, &latest_height_on_a)?;

    if packet.timed_out(&latest_timestamp, latest_height_on_a) {
        return Err(PacketError::PacketTimeoutElapsed {
            sequence: packet.seq_on_a,
            chain_height: latest_height_on_a,
            chain_timestamp: latest_timestamp,
        }
        .into());
    }

    let seq_send_path_on_a = SeqSendPath::new(&packet.port_id_on_a, &packet.chan_id_on_a);
    let next_seq_send_on_a = ctx_a.get_next_sequence_send(&seq_send_path_on_a)?;

    if packet.seq_on_a != next_seq_send_on_a {
        return Err(PacketError::PacketSequenceMismatch {
            expected: next_seq_send_on_a,
            actual: packet.seq_on_a,
        }
        .into());
    }

    Ok(())
}

/// Send the packet without any validation.
///
/// A prior call to [`send_packet_validate`] MUST have succeeded.
pub fn send_packet_execute(
    ctx_a: &mut impl SendPacketExecutionContext,
    packet: Packet,
) -> Result<(), ContextError> {
    {
        let seq_send_path_on_a = SeqSendPath::new(&packet.port_id_on_a, &packet.chan_id_on_a);
        let next_seq_send_on_a = ctx_a.get_next_sequence_send(&seq_send_path_on_a)?;

        ctx_a.store_next_sequence_send(&seq_send_path_on_a, next_seq_send_on_a.increment())?;
    }

    ctx_a.store_packet_commitment(
        &CommitmentPath::new(&packet.port_id_on_a, &packet.chan_id_on_a, packet.seq_on_a),
        compute_packet_commitment(
            &packet.data,
            &packet.timeout_height_on_b,
            &packet.timeout_timestamp_on_b,
        ),
    )?;

    // emit events and logs
    {
        let chan_end_path_on_a = ChannelEndPath::new(&packet.port_id_on_a, &packet.chan_id_on_a);
        let chan_end_on_a = ctx_a.channel_end(&chan_end_path_on_a)?;
        let conn_id_on_a = &chan_end_on_a.connection_hops()[0];

        ctx_a.log_message("success: packet send".to_string())?;
        let event = IbcEvent::SendPacket(SendPacket {
            packet,
            channel_ordering: chan_end_on_a.ordering,
            src_connection_id: conn_id_on_a.clone(),
        });
        ctx_a.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
        ctx_a.emit_ibc_event(event)?;
    }

    Ok(())
}
