use interlink_core_channel_types::channel::{ChannelEnd, Counterparty, Order, State};
use interlink_core_channel_types::commitment::{compute_ack_commitment, compute_packet_commitment};
use interlink_core_channel_types::error::{ChannelError, PacketError};
use interlink_core_channel_types::events::{ReceivePacket, WriteAcknowledgement};
use interlink_core_channel_types::msgs::MsgRecvPacket;
use interlink_core_channel_types::packet::Receipt;
use interlink_core_connection_types::State as ConnectionState;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::path::{
    AckPath, ChannelEndPath, CommitmentPath, CounterpartyUpgradePath, Path, ReceiptPath,
    SeqRecvPath,
};
use interlink_core_host::{ExecutionContext, ProofVerifier, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;

/// States in which a channel end still accepts packets from its counterparty.
const RECV_STATES: [State; 5] = [
    State::Open,
    State::InitUpgrade,
    State::TryUpgrade,
    State::Flushing,
    State::FlushComplete,
];

pub fn recv_packet_validate<ValCtx>(ctx_b: &ValCtx, msg: MsgRecvPacket) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    validate(ctx_b, &msg)

    // nothing to validate with the module, since `onRecvPacket` cannot fail.
    // If any error occurs, then an "error acknowledgement" must be returned.
}

pub fn recv_packet_execute<ExecCtx>(
    ctx_b: &mut ExecCtx,
    module: &mut dyn Module,
    msg: MsgRecvPacket,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let chan_end_path_on_b =
        ChannelEndPath::new(&msg.packet.port_id_on_b, &msg.packet.chan_id_on_b);
    let chan_end_on_b = ctx_b.channel_end(&chan_end_path_on_b)?;

    // Check if another relayer already relayed the packet.
    // We don't want to fail the transaction in this case.
    if packet_already_received(ctx_b, &chan_end_on_b, &msg)? {
        return Ok(());
    }

    let (extras, acknowledgement) = module.on_recv_packet_execute(&msg.packet, &msg.signer);

    // state changes
    {
        // `recvPacket` core handler state changes
        match chan_end_on_b.ordering {
            Order::Unordered => {
                let receipt_path_on_b = ReceiptPath::new(
                    &msg.packet.port_id_on_b,
                    &msg.packet.chan_id_on_b,
                    msg.packet.seq_on_a,
                );

                ctx_b.store_packet_receipt(&receipt_path_on_b, Receipt::Ok)?;
            }
            Order::Ordered => {
                let seq_recv_path_on_b =
                    SeqRecvPath::new(&msg.packet.port_id_on_b, &msg.packet.chan_id_on_b);
                let next_seq_recv = ctx_b.get_next_sequence_recv(&seq_recv_path_on_b)?;
                ctx_b.store_next_sequence_recv(&seq_recv_path_on_b, next_seq_recv.increment())?;
            }
            Order::None => {}
        }
        let ack_path_on_b = AckPath::new(
            &msg.packet.port_id_on_b,
            &msg.packet.chan_id_on_b,
            msg.packet.seq_on_a,
        );
        // `writeAcknowledgement` handler state changes
        ctx_b.store_packet_acknowledgement(
            &ack_path_on_b,
            compute_ack_commitment(&acknowledgement),
        )?;
    }

    // emit events and logs
    {
        ctx_b.log_message("success: packet receive".to_string())?;
        ctx_b.log_message("success: packet write acknowledgement".to_string())?;

        let conn_id_on_b = &chan_end_on_b.connection_hops()[0];
        let event = IbcEvent::ReceivePacket(ReceivePacket {
            packet: msg.packet.clone(),
            channel_ordering: chan_end_on_b.ordering,
            dst_connection_id: conn_id_on_b.clone(),
        });
        ctx_b.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
        ctx_b.emit_ibc_event(event)?;
        let event = IbcEvent::WriteAcknowledgement(WriteAcknowledgement {
            packet: msg.packet,
            acknowledgement,
            dst_connection_id: conn_id_on_b.clone(),
        });
        ctx_b.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
        ctx_b.emit_ibc_event(event)?;

        for module_event in extras.events {
            ctx_b.emit_ibc_event(IbcEvent::Module(module_event))?;
        }

        for log_message in extras.log {
            ctx_b.log_message(log_message)?;
        }
    }

    Ok(())
}

fn validate<Ctx>(ctx_b: &Ctx, msg: &MsgRecvPacket) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx_b.validate_message_signer(&msg.signer)?;

    let chan_end_path_on_b =
        ChannelEndPath::new(&msg.packet.port_id_on_b, &msg.packet.chan_id_on_b);
    let chan_end_on_b = ctx_b.channel_end(&chan_end_path_on_b)?;

    chan_end_on_b.verify_state_in(&RECV_STATES)?;

    // Once the counterparty froze its send sequence for an upgrade, packets
    // from at or above it were sent under the new channel parameters.
    let upgrade_path_on_b =
        CounterpartyUpgradePath::new(&msg.packet.port_id_on_b, &msg.packet.chan_id_on_b);
    if let Some(upgrade_on_a) = ctx_b.counterparty_upgrade(&upgrade_path_on_b)? {
        if msg.packet.seq_on_a >= upgrade_on_a.next_sequence_send {
            return Err(PacketError::PacketSentAfterUpgrade {
                sequence: msg.packet.seq_on_a,
                next_sequence_send: upgrade_on_a.next_sequence_send,
            }
            .into());
        }
    }

    let counterparty = Counterparty::new(
        msg.packet.port_id_on_a.clone(),
        Some(msg.packet.chan_id_on_a.clone()),
    );

    chan_end_on_b.verify_counterparty_matches(&counterparty)?;

    let conn_id_on_b = &chan_end_on_b.connection_hops()[0];
    let conn_end_on_b = ctx_b.connection_end(conn_id_on_b)?;

    conn_end_on_b.verify_state_matches(&ConnectionState::Open)?;

    let latest_height = ctx_b.host_height()?;
    let latest_timestamp = ctx_b.host_timestamp()?;
    if msg.packet.timed_out(&latest_timestamp, latest_height) {
        return Err(PacketError::PacketTimeoutElapsed {
            sequence: msg.packet.seq_on_a,
            chain_height: latest_height,
            chain_timestamp: latest_timestamp,
        }
        .into());
    }

    // Verify proofs
    {
        let client_id_on_b = conn_end_on_b.client_id();
        let verifier = ctx_b.proof_verifier();

        verifier.validate_proof_height(client_id_on_b, &msg.proof_height_on_a)?;

        let expected_commitment_on_a = compute_packet_commitment(
            &msg.packet.data,
            &msg.packet.timeout_height_on_b,
            &msg.packet.timeout_timestamp_on_b,
        );
        let commitment_path_on_a = CommitmentPath::new(
            &msg.packet.port_id_on_a,
            &msg.packet.chan_id_on_a,
            msg.packet.seq_on_a,
        );

        // Verify the proof for the packet against the chain store.
        verifier
            .verify_membership(
                client_id_on_b,
                conn_end_on_b.counterparty().prefix(),
                &msg.proof_commitment_on_a,
                &msg.proof_height_on_a,
                Path::Commitment(commitment_path_on_a),
                expected_commitment_on_a.into_vec(),
            )
            .map_err(|e| PacketError::PacketVerificationFailed {
                sequence: msg.packet.seq_on_a,
                client_error: e,
            })?;
    }

    match chan_end_on_b.ordering {
        Order::Ordered => {
            let seq_recv_path_on_b =
                SeqRecvPath::new(&msg.packet.port_id_on_b, &msg.packet.chan_id_on_b);
            let next_seq_recv = ctx_b.get_next_sequence_recv(&seq_recv_path_on_b)?;

            // A lower sequence was already received and is a no-op.
            if msg.packet.seq_on_a > next_seq_recv {
                return Err(PacketError::PacketSequenceMismatch {
                    expected: next_seq_recv,
                    actual: msg.packet.seq_on_a,
                }
                .into());
            }
        }
        Order::Unordered => {}
        Order::None => {
            return Err(ContextError::ChannelError(ChannelError::InvalidOrderType {
                expected: "Channel ordering cannot be None".to_string(),
                actual: chan_end_on_b.ordering.to_string(),
            }))
        }
    }

    Ok(())
}

fn packet_already_received<Ctx>(
    ctx_b: &Ctx,
    chan_end_on_b: &ChannelEnd,
    msg: &MsgRecvPacket,
) -> Result<bool, ContextError>
where
    Ctx: ValidationContext,
{
    let packet = &msg.packet;

    let already_received = match chan_end_on_b.ordering {
        Order::None => false,
        Order::Unordered => {
            let receipt_path_on_b =
                ReceiptPath::new(&packet.port_id_on_b, &packet.chan_id_on_b, packet.seq_on_a);
            ctx_b.get_packet_receipt(&receipt_path_on_b)?.is_ok()
        }
        Order::Ordered => {
            let seq_recv_path_on_b = SeqRecvPath::new(&packet.port_id_on_b, &packet.chan_id_on_b);
            let next_seq_recv = ctx_b.get_next_sequence_recv(&seq_recv_path_on_b)?;

            // the sequence number has already been incremented, so
            // another relayer already relayed the packet
            packet.seq_on_a < next_seq_recv
        }
    };

    Ok(already_received)
}
