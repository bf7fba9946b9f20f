//! Protocol logic specific to processing `MsgChannelOpenTry` messages.

use interlink_core_channel_types::channel::{
    ChannelEnd, Counterparty, IdentifiedChannelEnd, Order, State,
};
use interlink_core_channel_types::error::ChannelError;
use interlink_core_channel_types::events::OpenTry;
use interlink_core_channel_types::msgs::MsgChannelOpenTry;
use interlink_core_connection_types::error::ConnectionError;
use interlink_core_connection_types::State as ConnectionState;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::error::HostError;
use interlink_core_host::types::identifiers::ChannelId;
use interlink_core_host::types::path::{ChannelCapabilityPath, ChannelEndPath, Path};
use interlink_core_host::{ExecutionContext, ProofVerifier, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;
use interlink_primitives::proto::Protobuf;

use super::verify_capability_unclaimed;

pub fn chan_open_try_validate<ValCtx>(
    ctx_b: &ValCtx,
    module: &dyn Module,
    msg: MsgChannelOpenTry,
) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    validate(ctx_b, &msg)?;

    verify_reopen(ctx_b, module, &msg)?;

    let chan_id_on_b = ChannelId::new(ctx_b.channel_counter()?);

    module.on_chan_open_try_validate(
        msg.ordering,
        &msg.connection_hops_on_b,
        &msg.port_id_on_b,
        &chan_id_on_b,
        &Counterparty::new(msg.port_id_on_a.clone(), Some(msg.chan_id_on_a.clone())),
        &msg.version_supported_on_a,
    )?;

    verify_proofs(ctx_b, &msg)
}

pub fn chan_open_try_execute<ExecCtx>(
    ctx_b: &mut ExecCtx,
    module: &mut dyn Module,
    msg: MsgChannelOpenTry,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let chan_id_on_b = ChannelId::new(ctx_b.channel_counter()?);
    let (extras, version) = module.on_chan_open_try_execute(
        msg.ordering,
        &msg.connection_hops_on_b,
        &msg.port_id_on_b,
        &chan_id_on_b,
        &Counterparty::new(msg.port_id_on_a.clone(), Some(msg.chan_id_on_a.clone())),
        &msg.version_supported_on_a,
    )?;

    let conn_id_on_b = msg.connection_hops_on_b[0].clone();

    // state changes
    {
        let chan_end_on_b = ChannelEnd::new(
            State::TryOpen,
            msg.ordering,
            Counterparty::new(msg.port_id_on_a.clone(), Some(msg.chan_id_on_a.clone())),
            msg.connection_hops_on_b.clone(),
            version.clone(),
            0,
        )?;

        let chan_end_path_on_b = ChannelEndPath::new(&msg.port_id_on_b, &chan_id_on_b);
        ctx_b.store_channel(&chan_end_path_on_b, chan_end_on_b)?;
        ctx_b.increase_channel_counter()?;

        let capability_path = ChannelCapabilityPath::new(&msg.port_id_on_b, &chan_id_on_b);
        ctx_b.claim_capability(&capability_path)?;
    }

    // emit events and logs
    {
        ctx_b.log_message(format!(
            "success: channel open try with channel identifier: {chan_id_on_b}"
        ))?;

        let core_event = IbcEvent::OpenTryChannel(OpenTry {
            port_id_on_b: msg.port_id_on_b.clone(),
            chan_id_on_b: chan_id_on_b.clone(),
            port_id_on_a: msg.port_id_on_a.clone(),
            chan_id_on_a: msg.chan_id_on_a.clone(),
            conn_id_on_b,
            version_on_b: version,
        });
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

fn validate<Ctx>(ctx_b: &Ctx, msg: &MsgChannelOpenTry) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx_b.validate_message_signer(&msg.signer)?;

    msg.verify_connection_hops_length()?;

    if msg.ordering == Order::None {
        return Err(ChannelError::InvalidOrderType {
            expected: "Channel ordering cannot be None".to_string(),
            actual: msg.ordering.to_string(),
        }
        .into());
    }

    let conn_end_on_b = ctx_b.connection_end(&msg.connection_hops_on_b[0])?;

    conn_end_on_b.verify_state_matches(&ConnectionState::Open)?;

    let chan_id_on_b = ChannelId::new(ctx_b.channel_counter()?);

    verify_capability_unclaimed(ctx_b, &msg.port_id_on_b, &chan_id_on_b)
}

/// Lets the application decide whether a new channel may take over from
/// the channel it tracks for the same connection and counterparty port.
///
/// The tracked channel must be closed and its capability released before
/// the application is asked.
fn verify_reopen<Ctx>(
    ctx_b: &Ctx,
    module: &dyn Module,
    msg: &MsgChannelOpenTry,
) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    let conn_id_on_b = &msg.connection_hops_on_b[0];

    let Some(active_chan_id) = module.active_channel(conn_id_on_b, &msg.port_id_on_a) else {
        return Ok(());
    };

    let active_chan_end_path = ChannelEndPath::new(&msg.port_id_on_b, &active_chan_id);
    let active_chan_end = ctx_b.channel_end(&active_chan_end_path)?;

    if active_chan_end.state != State::Closed {
        return Err(ChannelError::ActiveChannelExists {
            port_id: msg.port_id_on_b.clone(),
            channel_id: active_chan_id,
            connection_id: conn_id_on_b.clone(),
        }
        .into());
    }

    let capability_path = ChannelCapabilityPath::new(&msg.port_id_on_b, &active_chan_id);
    if ctx_b.get_capability(&capability_path).is_some() {
        return Err(HostError::CapabilityAlreadyClaimed {
            path: capability_path.to_string(),
        }
        .into());
    }

    let closed_channel =
        IdentifiedChannelEnd::new(msg.port_id_on_b.clone(), active_chan_id, active_chan_end);

    module.on_chan_open_try_reopen(&closed_channel, &msg.version_supported_on_a)?;

    Ok(())
}

fn verify_proofs<Ctx>(ctx_b: &Ctx, msg: &MsgChannelOpenTry) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    let conn_end_on_b = ctx_b.connection_end(&msg.connection_hops_on_b[0])?;
    let client_id_on_b = conn_end_on_b.client_id();
    let verifier = ctx_b.proof_verifier();

    verifier.validate_proof_height(client_id_on_b, &msg.proof_height_on_a)?;

    let prefix_on_a = conn_end_on_b.counterparty().prefix();
    let conn_id_on_a = conn_end_on_b
        .counterparty()
        .connection_id()
        .ok_or(ConnectionError::MissingCounterpartyConnectionId)?;

    let expected_chan_end_on_a = ChannelEnd::new(
        State::Init,
        msg.ordering,
        Counterparty::new(msg.port_id_on_b.clone(), None),
        vec![conn_id_on_a.clone()],
        msg.version_supported_on_a.clone(),
        0,
    )?;
    let chan_end_path_on_a = ChannelEndPath::new(&msg.port_id_on_a, &msg.chan_id_on_a);

    // Verify the proof for the channel state against the expected channel end.
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

    Ok(())
}
