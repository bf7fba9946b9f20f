use interlink_core_channel_types::channel::{Counterparty, Order, State};
use interlink_core_channel_types::commitment::compute_packet_commitment;
use interlink_core_channel_types::error::{ChannelError, PacketError, UpgradeError};
use interlink_core_channel_types::events::{ChannelClosed, TimeoutPacket};
use interlink_core_channel_types::msgs::{MsgTimeout, MsgTimeoutOnClose};
use interlink_core_channel_types::packet::Packet;
use interlink_core_client_types::Height;
use interlink_core_commitment_types::commitment::CommitmentProofBytes;
use interlink_core_connection_types::ConnectionEnd;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::identifiers::Sequence;
use interlink_core_host::types::path::{
    ChannelEndPath, ChannelUpgradePath, CommitmentPath, CounterpartyUpgradePath, Path,
    ReceiptPath, SeqRecvPath,
};
use interlink_core_host::{ExecutionContext, ProofVerifier, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;

use super::timeout_on_close;
use crate::upgrade::{complete_flush_if_done, write_error_receipt};

/// States in which a sent packet can still be timed out.
const TIMEOUT_STATES: [State; 4] = [
    State::Open,
    State::InitUpgrade,
    State::TryUpgrade,
    State::Flushing,
];

pub enum TimeoutMsgType {
    Timeout(MsgTimeout),
    TimeoutOnClose(MsgTimeoutOnClose),
}

pub fn timeout_packet_validate<ValCtx>(
    ctx_a: &ValCtx,
    module: &dyn Module,
    timeout_msg_type: TimeoutMsgType,
) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    match &timeout_msg_type {
        TimeoutMsgType::Timeout(msg) => validate(ctx_a, msg),
        TimeoutMsgType::TimeoutOnClose(msg) => timeout_on_close::validate(ctx_a, msg),
    }?;

    let (packet, signer) = match timeout_msg_type {
        TimeoutMsgType::Timeout(msg) => (msg.packet, msg.signer),
        TimeoutMsgType::TimeoutOnClose(msg) => (msg.packet, msg.signer),
    };

    module
        .on_timeout_packet_validate(&packet, &signer)
        .map_err(ContextError::PacketError)
}

pub fn timeout_packet_execute<ExecCtx>(
    ctx_a: &mut ExecCtx,
    module: &mut dyn Module,
    timeout_msg_type: TimeoutMsgType,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let (packet, signer) = match timeout_msg_type {
        TimeoutMsgType::Timeout(msg) => (msg.packet, msg.signer),
        TimeoutMsgType::TimeoutOnClose(msg) => (msg.packet, msg.signer),
    };
    let chan_end_path_on_a = ChannelEndPath::new(&packet.port_id_on_a, &packet.chan_id_on_a);
    let chan_end_on_a = ctx_a.channel_end(&chan_end_path_on_a)?;
    let was_flushing = chan_end_on_a.state == State::Flushing;

    let (extras, cb_result) = module.on_timeout_packet_execute(&packet, &signer);

    cb_result?;

    // apply state changes
    let chan_end_on_a = {
        let commitment_path_on_a =
            CommitmentPath::new(&packet.port_id_on_a, &packet.chan_id_on_a, packet.seq_on_a);
        ctx_a.delete_packet_commitment(&commitment_path_on_a)?;

        if let Order::Ordered = chan_end_on_a.ordering {
            // An upgrade cannot outlive the channel it was upgrading.
            if chan_end_on_a.state.is_upgrading() {
                write_error_receipt(
                    ctx_a,
                    &packet.port_id_on_a,
                    &packet.chan_id_on_a,
                    &chan_end_on_a,
                    UpgradeError::ChannelClosedDuringUpgrade,
                )?;
                ctx_a.delete_channel_upgrade(&ChannelUpgradePath::new(
                    &packet.port_id_on_a,
                    &packet.chan_id_on_a,
                ))?;
                ctx_a.delete_counterparty_upgrade(&CounterpartyUpgradePath::new(
                    &packet.port_id_on_a,
                    &packet.chan_id_on_a,
                ))?;
            }

            let mut chan_end_on_a = chan_end_on_a;
            chan_end_on_a.state = State::Closed;
            ctx_a.store_channel(&chan_end_path_on_a, chan_end_on_a.clone())?;

            chan_end_on_a
        } else {
            chan_end_on_a
        }
    };

    // emit events and logs
    {
        ctx_a.log_message("success: packet timeout".to_string())?;

        let event = IbcEvent::TimeoutPacket(TimeoutPacket {
            packet: packet.clone(),
            channel_ordering: chan_end_on_a.ordering,
        });
        ctx_a.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
        ctx_a.emit_ibc_event(event)?;

        if let Order::Ordered = chan_end_on_a.ordering {
            let conn_id_on_a = chan_end_on_a.connection_hops()[0].clone();

            let event = IbcEvent::ChannelClosed(ChannelClosed {
                port_id_on_a: packet.port_id_on_a.clone(),
                chan_id_on_a: packet.chan_id_on_a.clone(),
                port_id_on_b: chan_end_on_a.counterparty().port_id.clone(),
                chan_id_on_b: chan_end_on_a.counterparty().channel_id.clone(),
                conn_id_on_a,
                channel_ordering: chan_end_on_a.ordering,
            });
            ctx_a.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
            ctx_a.emit_ibc_event(event)?;
        }

        for module_event in extras.events {
            ctx_a.emit_ibc_event(IbcEvent::Module(module_event))?;
        }

        for log_message in extras.log {
            ctx_a.log_message(log_message)?;
        }
    }

    if was_flushing && chan_end_on_a.ordering == Order::Unordered {
        complete_flush_if_done(ctx_a, module, &packet.port_id_on_a, &packet.chan_id_on_a)?;
    }

    Ok(())
}

fn validate<Ctx>(ctx_a: &Ctx, msg: &MsgTimeout) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx_a.validate_message_signer(&msg.signer)?;

    let chan_end_on_a = ctx_a.channel_end(&ChannelEndPath::new(
        &msg.packet.port_id_on_a,
        &msg.packet.chan_id_on_a,
    ))?;

    chan_end_on_a.verify_state_in(&TIMEOUT_STATES)?;

    let counterparty = Counterparty::new(
        msg.packet.port_id_on_b.clone(),
        Some(msg.packet.chan_id_on_b.clone()),
    );

    chan_end_on_a.verify_counterparty_matches(&counterparty)?;

    let conn_id_on_a = chan_end_on_a.connection_hops()[0].clone();
    let conn_end_on_a = ctx_a.connection_end(&conn_id_on_a)?;

    verify_packet_commitment(ctx_a, &msg.packet)?;

    // Verify proofs
    {
        let client_id_on_a = conn_end_on_a.client_id();
        let verifier = ctx_a.proof_verifier();

        verifier.validate_proof_height(client_id_on_a, &msg.proof_height_on_b)?;

        // check that timeout height or timeout timestamp has passed on the other end
        let timestamp_of_b =
            verifier.consensus_timestamp(client_id_on_a, &msg.proof_height_on_b)?;

        if !msg.packet.timed_out(&timestamp_of_b, msg.proof_height_on_b) {
            return Err(PacketError::PacketTimeoutNotReached {
                timeout_height: msg.packet.timeout_height_on_b,
                chain_height: msg.proof_height_on_b,
                timeout_timestamp: msg.packet.timeout_timestamp_on_b,
                chain_timestamp: timestamp_of_b,
            }
            .into());
        }

        verify_packet_unreceived(
            ctx_a,
            &conn_end_on_a,
            chan_end_on_a.ordering,
            &msg.packet,
            msg.next_seq_recv_on_b,
            &msg.proof_unreceived_on_b,
            &msg.proof_height_on_b,
        )?;
    }

    Ok(())
}

/// Checks that the packet was sent from this end and is still awaiting an
/// acknowledgement or timeout.
pub(super) fn verify_packet_commitment<Ctx>(ctx_a: &Ctx, packet: &Packet) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    let commitment_path_on_a =
        CommitmentPath::new(&packet.port_id_on_a, &packet.chan_id_on_a, packet.seq_on_a);

    // A timeout relayed twice finds no commitment.
    let commitment_on_a = ctx_a.get_packet_commitment(&commitment_path_on_a)?;

    let expected_commitment_on_a = compute_packet_commitment(
        &packet.data,
        &packet.timeout_height_on_b,
        &packet.timeout_timestamp_on_b,
    );
    if commitment_on_a != expected_commitment_on_a {
        return Err(PacketError::IncorrectPacketCommitment {
            sequence: packet.seq_on_a,
        }
        .into());
    }

    Ok(())
}

/// Verifies that chain B has not received the packet: an ordered channel
/// proves B's next receive sequence, an unordered one proves the absence of
/// B's receipt.
pub(super) fn verify_packet_unreceived<Ctx>(
    ctx_a: &Ctx,
    conn_end_on_a: &ConnectionEnd,
    ordering: Order,
    packet: &Packet,
    next_seq_recv_on_b: Sequence,
    proof_unreceived_on_b: &CommitmentProofBytes,
    proof_height_on_b: &Height,
) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    let client_id_on_a = conn_end_on_a.client_id();
    let verifier = ctx_a.proof_verifier();

    let next_seq_recv_verification_result = match ordering {
        Order::Ordered => {
            if packet.seq_on_a < next_seq_recv_on_b {
                return Err(PacketError::PacketAlreadyReceived {
                    sequence: packet.seq_on_a,
                    next_seq_recv: next_seq_recv_on_b,
                }
                .into());
            }
            let seq_recv_path_on_b = SeqRecvPath::new(&packet.port_id_on_b, &packet.chan_id_on_b);

            verifier.verify_membership(
                client_id_on_a,
                conn_end_on_a.counterparty().prefix(),
                proof_unreceived_on_b,
                proof_height_on_b,
                Path::SeqRecv(seq_recv_path_on_b),
                next_seq_recv_on_b.to_vec(),
            )
        }
        Order::Unordered => {
            let receipt_path_on_b =
                ReceiptPath::new(&packet.port_id_on_b, &packet.chan_id_on_b, packet.seq_on_a);

            verifier.verify_non_membership(
                client_id_on_a,
                conn_end_on_a.counterparty().prefix(),
                proof_unreceived_on_b,
                proof_height_on_b,
                Path::Receipt(receipt_path_on_b),
            )
        }
        Order::None => {
            return Err(ContextError::ChannelError(ChannelError::InvalidOrderType {
                expected: "Channel ordering cannot be None".to_string(),
                actual: ordering.to_string(),
            }))
        }
    };

    next_seq_recv_verification_result.map_err(|e| PacketError::PacketVerificationFailed {
        sequence: packet.seq_on_a,
        client_error: e,
    })?;

    Ok(())
}
