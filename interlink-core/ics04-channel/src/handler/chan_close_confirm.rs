//! Protocol logic specific to processing `MsgChannelCloseConfirm` messages.

use interlink_core_channel_types::channel::{ChannelEnd, Counterparty, State};
use interlink_core_channel_types::error::ChannelError;
use interlink_core_channel_types::events::CloseConfirm;
use interlink_core_channel_types::msgs::MsgChannelCloseConfirm;
use interlink_core_connection_types::error::ConnectionError;
use interlink_core_connection_types::State as ConnectionState;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::path::{ChannelEndPath, Path};
use interlink_core_host::{ExecutionContext, ProofVerifier, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;
use interlink_primitives::proto::Protobuf;

use super::verify_channel_capability;

pub fn chan_close_confirm_validate<ValCtx>(
    ctx_b: &ValCtx,
    module: &dyn Module,
    msg: MsgChannelCloseConfirm,
) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    validate(ctx_b, &msg)?;

    module.on_chan_close_confirm_validate(&msg.port_id_on_b, &msg.chan_id_on_b)?;

    Ok(())
}

pub fn chan_close_confirm_execute<ExecCtx>(
    ctx_b: &mut ExecCtx,
    module: &mut dyn Module,
    msg: MsgChannelCloseConfirm,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let extras = module.on_chan_close_confirm_execute(&msg.port_id_on_b, &msg.chan_id_on_b)?;
    let chan_end_path_on_b = ChannelEndPath::new(&msg.port_id_on_b, &msg.chan_id_on_b);
    let chan_end_on_b = ctx_b.channel_end(&chan_end_path_on_b)?;

    // state changes
    {
        let chan_end_on_b = {
            let mut chan_end_on_b = chan_end_on_b.clone();
            chan_end_on_b.set_state(State::Closed);
            chan_end_on_b
        };
        ctx_b.store_channel(&chan_end_path_on_b, chan_end_on_b)?;
    }

    // emit events and logs
    {
        ctx_b.log_message("success: channel close confirm".to_string())?;

        let core_event = {
            let port_id_on_a = chan_end_on_b.counterparty().port_id.clone();
            let chan_id_on_a = chan_end_on_b.counterparty().channel_id.clone();
            let conn_id_on_b = chan_end_on_b.connection_hops[0].clone();

            IbcEvent::CloseConfirmChannel(CloseConfirm {
                port_id_on_b: msg.port_id_on_b.clone(),
                chan_id_on_b: msg.chan_id_on_b.clone(),
                port_id_on_a,
                chan_id_on_a,
                conn_id_on_b,
            })
        };
        ctx_b.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
        ctx_b.emit_ibc_event(core_event)?;

        for module_event in extras.events {
            ctx_b.emit_ibc_event(IbcEvent::Module(module_event))?;
        }

        for log_message in extras.log {
            ctx_b.log_message(log_message)?;
        }
    }

    Ok(())
}

fn validate<Ctx>(ctx_b: &Ctx, msg: &MsgChannelCloseConfirm) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx_b.validate_message_signer(&msg.signer)?;

    // Retrieve the old channel end and validate it against the message.
    let chan_end_path_on_b = ChannelEndPath::new(&msg.port_id_on_b, &msg.chan_id_on_b);
    let chan_end_on_b = ctx_b.channel_end(&chan_end_path_on_b)?;

    // Only an open channel can be closed.
    chan_end_on_b.verify_state_matches(&State::Open)?;

    verify_channel_capability(ctx_b, &msg.port_id_on_b, &msg.chan_id_on_b)?;

    chan_end_on_b.verify_connection_hops_length()?;

    let conn_end_on_b = ctx_b.connection_end(&chan_end_on_b.connection_hops()[0])?;

    conn_end_on_b.verify_state_matches(&ConnectionState::Open)?;

    // Verify proofs
    {
        let client_id_on_b = conn_end_on_b.client_id();
        let verifier = ctx_b.proof_verifier();

        verifier.validate_proof_height(client_id_on_b, &msg.proof_height_on_a)?;

        let prefix_on_a = conn_end_on_b.counterparty().prefix();
        let port_id_on_a = chan_end_on_b.counterparty().port_id();
        let chan_id_on_a = chan_end_on_b
            .counterparty()
            .channel_id()
            .ok_or(ChannelError::MissingCounterparty)?;
        let conn_id_on_a = conn_end_on_b
            .counterparty()
            .connection_id()
            .ok_or(ConnectionError::MissingCounterpartyConnectionId)?;

        let expected_chan_end_on_a = ChannelEnd::new(
            State::Closed,
            *chan_end_on_b.ordering(),
            Counterparty::new(msg.port_id_on_b.clone(), Some(msg.chan_id_on_b.clone())),
            vec![conn_id_on_a.clone()],
            chan_end_on_b.version().clone(),
            msg.counterparty_upgrade_sequence,
        )?;
        let chan_end_path_on_a = ChannelEndPath::new(port_id_on_a, chan_id_on_a);

        verifier
            .verify_membership(
                client_id_on_b,
                prefix_on_a,
                &msg.proof_chan_end_on_a,
                &msg.proof_height_on_a,
                Path::ChannelEnd(chan_end_path_on_a),
                expected_chan_end_on_a.encode_vec(),
            )
            .map_err(ChannelError::VerifyChannelFailed)?;
    }

    Ok(())
}
