//! Protocol logic specific to processing `MsgChannelOpenInit` messages.

use interlink_core_channel_types::channel::{ChannelEnd, Counterparty, Order, State};
use interlink_core_channel_types::error::ChannelError;
use interlink_core_channel_types::events::OpenInit;
use interlink_core_channel_types::msgs::MsgChannelOpenInit;
use interlink_core_connection_types::State as ConnectionState;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::identifiers::ChannelId;
use interlink_core_host::types::path::{ChannelCapabilityPath, ChannelEndPath};
use interlink_core_host::{ExecutionContext, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;

use super::verify_capability_unclaimed;

pub fn chan_open_init_validate<ValCtx>(
    ctx_a: &ValCtx,
    module: &dyn Module,
    msg: MsgChannelOpenInit,
) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    validate(ctx_a, &msg)?;
    let chan_id_on_a = ChannelId::new(ctx_a.channel_counter()?);

    module.on_chan_open_init_validate(
        msg.ordering,
        &msg.connection_hops_on_a,
        &msg.port_id_on_a,
        &chan_id_on_a,
        &Counterparty::new(msg.port_id_on_b.clone(), None),
        &msg.version_proposal,
    )?;

    Ok(())
}

pub fn chan_open_init_execute<ExecCtx>(
    ctx_a: &mut ExecCtx,
    module: &mut dyn Module,
    msg: MsgChannelOpenInit,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let chan_id_on_a = ChannelId::new(ctx_a.channel_counter()?);
    let (extras, version) = module.on_chan_open_init_execute(
        msg.ordering,
        &msg.connection_hops_on_a,
        &msg.port_id_on_a,
        &chan_id_on_a,
        &Counterparty::new(msg.port_id_on_b.clone(), None),
        &msg.version_proposal,
    )?;

    let conn_id_on_a = msg.connection_hops_on_a[0].clone();

    // state changes
    {
        let chan_end_on_a = ChannelEnd::new(
            State::Init,
            msg.ordering,
            Counterparty::new(msg.port_id_on_b.clone(), None),
            msg.connection_hops_on_a.clone(),
            version.clone(),
            0,
        )?;
        let chan_end_path_on_a = ChannelEndPath::new(&msg.port_id_on_a, &chan_id_on_a);
        ctx_a.store_channel(&chan_end_path_on_a, chan_end_on_a)?;

        ctx_a.increase_channel_counter()?;

        let capability_path = ChannelCapabilityPath::new(&msg.port_id_on_a, &chan_id_on_a);
        ctx_a.claim_capability(&capability_path)?;
    }

    // emit events and logs
    {
        ctx_a.log_message(format!(
            "success: channel open init with channel identifier: {chan_id_on_a}"
        ))?;
        let core_event = IbcEvent::OpenInitChannel(OpenInit {
            port_id_on_a: msg.port_id_on_a.clone(),
            chan_id_on_a: chan_id_on_a.clone(),
            port_id_on_b: msg.port_id_on_b,
            conn_id_on_a,
            version_on_a: version,
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

fn validate<ValCtx>(ctx_a: &ValCtx, msg: &MsgChannelOpenInit) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    ctx_a.validate_message_signer(&msg.signer)?;

    msg.verify_connection_hops_length()?;

    if msg.ordering == Order::None {
        return Err(ChannelError::InvalidOrderType {
            expected: "Channel ordering cannot be None".to_string(),
            actual: msg.ordering.to_string(),
        }
        .into());
    }

    // An IBC connection running on the local (host) chain should exist.
    let conn_end_on_a = ctx_a.connection_end(&msg.connection_hops_on_a[0])?;
    conn_end_on_a.verify_state_matches(&ConnectionState::Open)?;

    let chan_id_on_a = ChannelId::new(ctx_a.channel_counter()?);
    let chan_end_path_on_a = ChannelEndPath::new(&msg.port_id_on_a, &chan_id_on_a);
    if ctx_a.channel_end(&chan_end_path_on_a).is_ok() {
        return Err(ChannelError::ChannelExists {
            port_id: msg.port_id_on_a.clone(),
            channel_id: chan_id_on_a,
        }
        .into());
    }

    verify_capability_unclaimed(ctx_a, &msg.port_id_on_a, &chan_id_on_a)
}
