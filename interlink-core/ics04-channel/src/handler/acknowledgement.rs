use interlink_core_channel_types::channel::{Counterparty, Order, State};
use interlink_core_channel_types::commitment::{compute_ack_commitment, compute_packet_commitment};
use interlink_core_channel_types::error::PacketError;
use interlink_core_channel_types::events::AcknowledgePacket;
use interlink_core_channel_types::msgs::MsgAcknowledgement;
use interlink_core_connection_types::State as ConnectionState;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::path::{AckPath, ChannelEndPath, CommitmentPath, Path, SeqAckPath};
use interlink_core_host::{ExecutionContext, ProofVerifier, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;

use crate::upgrade::complete_flush_if_done;

/// States in which acknowledgements of sent packets are still processed.
const ACK_STATES: [State; 4] = [
    State::Open,
    State::InitUpgrade,
    State::TryUpgrade,
    State::Flushing,
];

pub fn acknowledgement_packet_validate<ValCtx>(
    ctx_a: &ValCtx,
    module: &dyn Module,
    msg: MsgAcknowledgement,
) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    validate(ctx_a, &msg)?;

    module
        .on_acknowledgement_packet_validate(&msg.packet, &msg.acknowledgement, &msg.signer)
        .map_err(ContextError::PacketError)
}

pub fn acknowledgement_packet_execute<ExecCtx>(
    ctx_a: &mut ExecCtx,
    module: &mut dyn Module,
    msg: MsgAcknowledgement,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let chan_end_path_on_a =
        ChannelEndPath::new(&msg.packet.port_id_on_a, &msg.packet.chan_id_on_a);
    let chan_end_on_a = ctx_a.channel_end(&chan_end_path_on_a)?;
    let conn_id_on_a = &chan_end_on_a.connection_hops()[0];

    let (extras, cb_result) =
        module.on_acknowledgement_packet_execute(&msg.packet, &msg.acknowledgement, &msg.signer);

    cb_result?;

    // apply state changes
    {
        let commitment_path_on_a = CommitmentPath::new(
            &msg.packet.port_id_on_a,
            &msg.packet.chan_id_on_a,
            msg.packet.seq_on_a,
        );
        ctx_a.delete_packet_commitment(&commitment_path_on_a)?;

        if let Order::Ordered = chan_end_on_a.ordering {
            // Note: in validation, we verified that `msg.packet.sequence == nextSeqAck`
            // (where `nextSeqAck` is the value in the store)
            let seq_ack_path_on_a =
                SeqAckPath::new(&msg.packet.port_id_on_a, &msg.packet.chan_id_on_a);
            ctx_a.store_next_sequence_ack(&seq_ack_path_on_a, msg.packet.seq_on_a.increment())?;
        }
    }

    // emit events and logs
    {
        ctx_a.log_message("success: packet acknowledgement".to_string())?;

        let event = IbcEvent::AcknowledgePacket(AcknowledgePacket {
            packet: msg.packet.clone(),
            channel_ordering: chan_end_on_a.ordering,
            src_connection_id: conn_id_on_a.clone(),
        });
        ctx_a.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
        ctx_a.emit_ibc_event(event)?;

        for module_event in extras.events {
            ctx_a.emit_ibc_event(IbcEvent::Module(module_event))?
        }

        for log_message in extras.log {
            ctx_a.log_message(log_message)?;
        }
    }

    if chan_end_on_a.state == State::Flushing {
        complete_flush_if_done(
            ctx_a,
            module,
            &msg.packet.port_id_on_a,
            &msg.packet.chan_id_on_a,
        )?;
    }

    Ok(())
}

fn validate<Ctx>(ctx_a: &Ctx, msg: &MsgAcknowledgement) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx_a.validate_message_signer(&msg.signer)?;

    let packet = &msg.packet;
    let chan_end_path_on_a = ChannelEndPath::new(&packet.port_id_on_a, &packet.chan_id_on_a);
    let chan_end_on_a = ctx_a.channel_end(&chan_end_path_on_a)?;

    chan_end_on_a.verify_state_in(&ACK_STATES)?;

    let counterparty = Counterparty::new(
        packet.port_id_on_b.clone(),
        Some(packet.chan_id_on_b.clone()),
    );

    chan_end_on_a.verify_counterparty_matches(&counterparty)?;

    let conn_id_on_a = &chan_end_on_a.connection_hops()[0];
    let conn_end_on_a = ctx_a.connection_end(conn_id_on_a)?;

    conn_end_on_a.verify_state_matches(&ConnectionState::Open)?;

    let commitment_path_on_a =
        CommitmentPath::new(&packet.port_id_on_a, &packet.chan_id_on_a, packet.seq_on_a);

    // A second acknowledgement of the same packet finds no commitment.
    let commitment_on_a = ctx_a.get_packet_commitment(&commitment_path_on_a)?;

    if commitment_on_a
        != compute_packet_commitment(
            &packet.data,
            &packet.timeout_height_on_b,
            &packet.timeout_timestamp_on_b,
        )
    {
        return Err(PacketError::IncorrectPacketCommitment {
            sequence: packet.seq_on_a,
        }
        .into());
    }

    if let Order::Ordered = chan_end_on_a.ordering {
        let seq_ack_path_on_a = SeqAckPath::new(&packet.port_id_on_a, &packet.chan_id_on_a);
        let next_seq_ack = ctx_a.get_next_sequence_ack(&seq_ack_path_on_a)?;
        if packet.seq_on_a != next_seq_ack {
            return Err(PacketError::PacketSequenceMismatch {
                expected: next_seq_ack,
                actual: packet.seq_on_a,
            }
            .into());
        }
    }

    // Verify proofs
    {
        let client_id_on_a = conn_end_on_a.client_id();
        let verifier = ctx_a.proof_verifier();

        verifier.validate_proof_height(client_id_on_a, &msg.proof_height_on_b)?;

        let ack_commitment = compute_ack_commitment(&msg.acknowledgement);
        let ack_path_on_b =
            AckPath::new(&packet.port_id_on_b, &packet.chan_id_on_b, packet.seq_on_a);

        // Verify the proof for the packet against the chain store.
        verifier
            .verify_membership(
                client_id_on_a,
                conn_end_on_a.counterparty().prefix(),
                &msg.proof_acked_on_b,
                &msg.proof_height_on_b,
                Path::Ack(ack_path_on_b),
                ack_commitment.into_vec(),
            )
            .map_err(|e| PacketError::PacketVerificationFailed {
                sequence: packet.seq_on_a,
                client_error: e,
            })?;
    }

    Ok(())
}
