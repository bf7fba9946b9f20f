//! Provides utility functions for querying channel, packet and upgrade state.

use interlink_core_channel_types::channel::{IdentifiedChannelEnd, Order};
use interlink_core_channel_types::commitment::{AcknowledgementCommitment, PacketCommitment};
use interlink_core_channel_types::packet::Receipt;
use interlink_core_channel_types::upgrade::{ErrorReceipt, Upgrade};
use interlink_core_handler_types::error::ContextError;
use interlink_core_host::types::identifiers::{ChannelId, PortId, Sequence};
use interlink_core_host::types::path::{
    AckPath, ChannelEndPath, CommitmentPath, ReceiptPath, SeqAckPath, SeqRecvPath, SeqSendPath,
    UpgradeErrorPath,
};
use interlink_core_host::ValidationContext;
use interlink_primitives::prelude::*;

use crate::upgrade::{expect_counterparty_upgrade, expect_upgrade};

/// Queries for a specific channel by the given port and channel ids.
pub fn query_channel<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<IdentifiedChannelEnd, ContextError>
where
    Ctx: ValidationContext,
{
    let channel_end = ctx.channel_end(&ChannelEndPath::new(port_id, channel_id))?;

    Ok(IdentifiedChannelEnd::new(
        port_id.clone(),
        channel_id.clone(),
        channel_end,
    ))
}

pub fn query_next_sequence_send<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<Sequence, ContextError>
where
    Ctx: ValidationContext,
{
    ctx.get_next_sequence_send(&SeqSendPath::new(port_id, channel_id))
}

pub fn query_next_sequence_receive<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<Sequence, ContextError>
where
    Ctx: ValidationContext,
{
    ctx.get_next_sequence_recv(&SeqRecvPath::new(port_id, channel_id))
}

pub fn query_next_sequence_ack<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<Sequence, ContextError>
where
    Ctx: ValidationContext,
{
    ctx.get_next_sequence_ack(&SeqAckPath::new(port_id, channel_id))
}

/// Queries for the packet commitment associated with a channel by the given
/// sequence, channel and port ids
pub fn query_packet_commitment<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
    sequence: Sequence,
) -> Result<PacketCommitment, ContextError>
where
    Ctx: ValidationContext,
{
    ctx.get_packet_commitment(&CommitmentPath::new(port_id, channel_id, sequence))
}

/// Queries for the sequences of all packet commitments of a channel
pub fn query_packet_commitments<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<Vec<Sequence>, ContextError>
where
    Ctx: ValidationContext,
{
    ctx.packet_commitment_sequences(&ChannelEndPath::new(port_id, channel_id))
}

/// Queries for the packet acknowledgement associated with a channel by the
/// given sequence, channel and port ids
pub fn query_packet_acknowledgement<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
    sequence: Sequence,
) -> Result<AcknowledgementCommitment, ContextError>
where
    Ctx: ValidationContext,
{
    ctx.get_packet_acknowledgement(&AckPath::new(port_id, channel_id, sequence))
}

/// Queries for the upgrade in progress on a channel.
pub fn query_upgrade<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<Upgrade, ContextError>
where
    Ctx: ValidationContext,
{
    expect_upgrade(ctx, port_id, channel_id)
}

/// Queries for the counterparty upgrade learnt while flushing.
pub fn query_counterparty_upgrade<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<Upgrade, ContextError>
where
    Ctx: ValidationContext,
{
    expect_counterparty_upgrade(ctx, port_id, channel_id)
}

/// Queries for the error receipt of the last aborted upgrade attempt, if
/// any.
pub fn query_upgrade_error<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<Option<ErrorReceipt>, ContextError>
where
    Ctx: ValidationContext,
{
    ctx.upgrade_error_receipt(&UpgradeErrorPath::new(port_id, channel_id))
}

/// Out of `sequences` sent by the counterparty, returns the ones this
/// receiving end has not received yet.
pub fn query_unreceived_packets<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
    sequences: impl IntoIterator<Item = Sequence>,
) -> Result<Vec<Sequence>, ContextError>
where
    Ctx: ValidationContext,
{
    let channel_end = ctx.channel_end(&ChannelEndPath::new(port_id, channel_id))?;

    match channel_end.ordering {
        Order::Ordered => {
            let next_seq_recv = ctx.get_next_sequence_recv(&SeqRecvPath::new(port_id, channel_id))?;

            Ok(sequences
                .into_iter()
                .filter(|seq| *seq >= next_seq_recv)
                .collect())
        }
        _ => {
            let mut unreceived = Vec::new();

            for seq in sequences {
                let receipt = ctx.get_packet_receipt(&ReceiptPath::new(port_id, channel_id, seq))?;
                if receipt == Receipt::None {
                    unreceived.push(seq);
                }
            }

            Ok(unreceived)
        }
    }
}

/// Out of `sequences` sent by this end, returns the ones whose
/// acknowledgement has not been processed yet.
pub fn query_unreceived_acks<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
    sequences: impl IntoIterator<Item = Sequence>,
) -> Result<Vec<Sequence>, ContextError>
where
    Ctx: ValidationContext,
{
    let in_flight = ctx.packet_commitment_sequences(&ChannelEndPath::new(port_id, channel_id))?;

    Ok(sequences
        .into_iter()
        .filter(|seq| in_flight.contains(seq))
        .collect())
}
