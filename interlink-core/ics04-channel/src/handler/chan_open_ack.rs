//! Protocol logic specific to processing `MsgChannelOpenAck` messages.

use interlink_core_channel_types::channel::{ChannelEnd, Counterparty, State};
use interlink_core_channel_types::error::ChannelError;
use interlink_core_channel_types::events::OpenAck;
use interlink_core_channel_types::msgs::MsgChannelOpenAck;
use interlink_core_connection_types::error::ConnectionError;
use interlink_core_connection_types::State as ConnectionState;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::path::{ChannelEndPath, Path, SeqAckPath, SeqRecvPath, SeqSendPath};
use interlink_core_host::{ExecutionContext, ProofVerifier, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;
use interlink_primitives::proto::Protobuf;

use super::verify_channel_capability;

pub fn chan_open_ack_validate<ValCtx>(
    ctx_a: &ValCtx,
    module: &dyn Module,
    msg: MsgChannelOpenAck,
) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    validate(ctx_a, &msg)?;

    module.on_chan_open_ack_validate(&msg.port_id_on_a, &msg.chan_id_on_a, &msg.version_on_b)?;

    Ok(())
}

pub fn chan_open_ack_execute<ExecCtx>(
    ctx_a: &mut ExecCtx,
    module: &mut dyn Module,
    msg: MsgChannelOpenAck,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let extras =
        module.on_chan_open_ack_execute(&msg.port_id_on_a, &msg.chan_id_on_a, &msg.version_on_b)?;

    let chan_end_path_on_a = ChannelEndPath::new(&msg.port_id_on_a, &msg.chan_id_on_a);
    let chan_end_on_a = ctx_a.channel_end(&chan_end_path_on_a)?;

    // state changes
    {
        let chan_end_on_a = {
            let mut chan_end_on_a = chan_end_on_a.clone();

            chan_end_on_a.set_state(State::Open);
            chan_end_on_a.set_version(msg.version_on_b.clone());
            chan_end_on_a.set_counterparty_channel_id(msg.chan_id_on_b.clone());

            chan_end_on_a
        };
        ctx_a.store_channel(&chan_end_path_on_a, chan_end_on_a)?;

        // Initialize send, recv, and ack sequence numbers.
        let seq_send_path = SeqSendPath::new(&msg.port_id_on_a, &msg.chan_id_on_a);
        ctx_a.store_next_sequence_send(&seq_send_path, 1.into())?;

        let seq_recv_path = SeqRecvPath::new(&msg.port_id_on_a, &msg.chan_id_on_a);
        ctx_a.store_next_sequence_recv(&seq_recv_path, 1.into())?;

        let seq_ack_path = SeqAckPath::new(&msg.port_id_on_a, &msg.chan_id_on_a);
        ctx_a.store_next_sequence_ack(&seq_ack_path, 1.into())?;
    }

    // emit events and logs
    {
        ctx_a.log_message("success: channel open ack".to_string())?;

        let conn_id_on_a = chan_end_on_a.connection_hops[0].clone();

        let core_event = IbcEvent::OpenAckChannel(OpenAck {
            port_id_on_a: msg.port_id_on_a.clone(),
            chan_id_on_a: msg.chan_id_on_a.clone(),
            port_id_on_b: chan_end_on_a.counterparty().port_id.clone(),
            chan_id_on_b: msg.chan_id_on_b,
            conn_id_on_a,
        });
        ctx_a.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
        ctx_a.emit_ibc_event(core_event)?;

        for module_event in extras.events {
            ctx_a.emit_ibc_event(IbcEvent::Module(module_event))?;
        }

        for log_message in extras.log {
            ctx_a.log_message(log_message)?;
        }
    }

    Ok(())
}

fn validate<Ctx>(ctx_a: &Ctx, msg: &MsgChannelOpenAck) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx_a.validate_message_signer(&msg.signer)?;

    let chan_end_path_on_a = ChannelEndPath::new(&msg.port_id_on_a, &msg.chan_id_on_a);
    let chan_end_on_a = ctx_a.channel_end(&chan_end_path_on_a)?;

    // Validate that the channel end is in a state where it can be ack.
    chan_end_on_a.verify_state_matches(&State::Init)?;

    verify_channel_capability(ctx_a, &msg.port_id_on_a, &msg.chan_id_on_a)?;

    // An OPEN IBC connection running on the local (host) chain should exist.
    chan_end_on_a.verify_connection_hops_length()?;

    let conn_end_on_a = ctx_a.connection_end(&chan_end_on_a.connection_hops()[0])?;

    conn_end_on_a.verify_state_matches(&ConnectionState::Open)?;

    // Verify proofs
    {
        let client_id_on_a = conn_end_on_a.client_id();
        let verifier = ctx_a.proof_verifier();

        verifier.validate_proof_height(client_id_on_a, &msg.proof_height_on_b)?;

        let prefix_on_b = conn_end_on_a.counterparty().prefix();
        let port_id_on_b = &chan_end_on_a.counterparty().port_id;
        let conn_id_on_b = conn_end_on_a
            .counterparty()
            .connection_id()
            .ok_or(ConnectionError::MissingCounterpartyConnectionId)?;

        let expected_chan_end_on_b = ChannelEnd::new(
            State::TryOpen,
            // Note: Both ends of a channel must have the same ordering, so it's
            // fine to use A's ordering here
            *chan_end_on_a.ordering(),
            Counterparty::new(msg.port_id_on_a.clone(), Some(msg.chan_id_on_a.clone())),
            vec![conn_id_on_b.clone()],
            msg.version_on_b.clone(),
            0,
        )?;
        let chan_end_path_on_b = ChannelEndPath::new(port_id_on_b, &msg.chan_id_on_b);

        // Verify the proof for the channel state against the expected channel end.
        verifier
            .verify_membership(
                client_id_on_a,
                prefix_on_b,
                &msg.proof_chan_end_on_b,
                &msg.proof_height_on_b,
                Path::ChannelEnd(chan_end_path_on_b),
                expected_chan_end_on_b.encode_vec(),
            )
            .map_err(ChannelError::VerifyChannelFailed)?;
    }

    Ok(())
}
