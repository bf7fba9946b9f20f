//! Protocol logic specific to processing `MsgChannelUpgradeInit` messages.

use interlink_core_channel_types::channel::State;
use interlink_core_channel_types::events::{UpgradeAttributes, UpgradeInit};
use interlink_core_channel_types::msgs::MsgChannelUpgradeInit;
use interlink_core_channel_types::upgrade::{Upgrade, UpgradeFields};
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::identifiers::{ChannelId, PortId, Sequence};
use interlink_core_host::types::path::{ChannelEndPath, ChannelUpgradePath};
use interlink_core_host::{ExecutionContext, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;

use crate::upgrade::validate_upgrade_fields;

pub fn chan_upgrade_init_validate<ValCtx>(
    ctx_a: &ValCtx,
    module: &dyn Module,
    msg: MsgChannelUpgradeInit,
) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    validate(ctx_a, &msg)?;

    let version = module.on_chan_upgrade_init_validate(
        &msg.port_id_on_a,
        &msg.chan_id_on_a,
        msg.fields.ordering,
        &msg.fields.connection_hops,
        &msg.fields.version,
    )?;

    let upgrade_fields = UpgradeFields::new(msg.fields.ordering, msg.fields.connection_hops, version);

    revalidate_application_fields(ctx_a, &msg.port_id_on_a, &msg.chan_id_on_a, &upgrade_fields)
}

pub fn chan_upgrade_init_execute<ExecCtx>(
    ctx_a: &mut ExecCtx,
    module: &mut dyn Module,
    msg: MsgChannelUpgradeInit,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let chan_end_path_on_a = ChannelEndPath::new(&msg.port_id_on_a, &msg.chan_id_on_a);
    let mut chan_end_on_a = ctx_a.channel_end(&chan_end_path_on_a)?;

    let (extras, version) = module.on_chan_upgrade_init_execute(
        &msg.port_id_on_a,
        &msg.chan_id_on_a,
        msg.fields.ordering,
        &msg.fields.connection_hops,
        &msg.fields.version,
    )?;

    let upgrade_fields = UpgradeFields::new(msg.fields.ordering, msg.fields.connection_hops, version);

    revalidate_application_fields(ctx_a, &msg.port_id_on_a, &msg.chan_id_on_a, &upgrade_fields)?;

    // state changes
    {
        chan_end_on_a.upgrade_sequence += 1;
        chan_end_on_a.set_state(State::InitUpgrade);
        ctx_a.store_channel(&chan_end_path_on_a, chan_end_on_a.clone())?;

        // The send sequence is only frozen once this end starts flushing.
        let upgrade = Upgrade::new(upgrade_fields.clone(), msg.timeout, Sequence::from(0));
        ctx_a.store_channel_upgrade(
            &ChannelUpgradePath::new(&msg.port_id_on_a, &msg.chan_id_on_a),
            upgrade,
        )?;
    }

    // emit events and logs
    {
        ctx_a.log_message("success: channel upgrade init".to_string())?;

        let core_event = IbcEvent::UpgradeInitChannel(UpgradeInit {
            attributes: UpgradeAttributes::new(&msg.port_id_on_a, &msg.chan_id_on_a, &chan_end_on_a),
            upgrade_fields,
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

fn validate<Ctx>(ctx_a: &Ctx, msg: &MsgChannelUpgradeInit) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx_a.validate_message_signer(&msg.signer)?;

    msg.validate_basic()?;

    let chan_end_path_on_a = ChannelEndPath::new(&msg.port_id_on_a, &msg.chan_id_on_a);
    let chan_end_on_a = ctx_a.channel_end(&chan_end_path_on_a)?;

    // Only one upgrade attempt at a time.
    chan_end_on_a.verify_state_matches(&State::Open)?;

    validate_upgrade_fields(ctx_a, &msg.fields, &chan_end_on_a)?;

    Ok(())
}

/// Checks the proposal again once the application has settled on the
/// version.
fn revalidate_application_fields<Ctx>(
    ctx_a: &Ctx,
    port_id_on_a: &PortId,
    chan_id_on_a: &ChannelId,
    upgrade_fields: &UpgradeFields,
) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    let chan_end_on_a = ctx_a.channel_end(&ChannelEndPath::new(port_id_on_a, chan_id_on_a))?;

    validate_upgrade_fields(ctx_a, upgrade_fields, &chan_end_on_a)
}
