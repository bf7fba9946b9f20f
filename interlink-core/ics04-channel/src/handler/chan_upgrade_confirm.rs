//! Protocol logic specific to processing `MsgChannelUpgradeConfirm` messages.

use interlink_core_channel_types::channel::State;
use interlink_core_channel_types::error::{ChannelError, UpgradeError};
use interlink_core_channel_types::events::{UpgradeAttributes, UpgradeConfirm};
use interlink_core_channel_types::msgs::MsgChannelUpgradeConfirm;
use interlink_core_connection_types::State as ConnectionState;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::path::{ChannelEndPath, CounterpartyUpgradePath};
use interlink_core_host::{ExecutionContext, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;

use crate::upgrade::{
    abort_upgrade, commit_upgrade, counterparty_ids, expect_upgrade, expected_counterparty_channel,
    flush_state, upgrade_timeout_elapsed, verify_counterparty_channel,
    verify_counterparty_upgrade,
};

pub fn chan_upgrade_confirm_validate<ValCtx>(
    ctx_b: &ValCtx,
    msg: MsgChannelUpgradeConfirm,
) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    validate(ctx_b, &msg)
}

pub fn chan_upgrade_confirm_execute<ExecCtx>(
    ctx_b: &mut ExecCtx,
    module: &mut dyn Module,
    msg: MsgChannelUpgradeConfirm,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let port_id_on_b = &msg.port_id_on_b;
    let chan_id_on_b = &msg.chan_id_on_b;
    let chan_end_path_on_b = ChannelEndPath::new(port_id_on_b, chan_id_on_b);
    let mut chan_end_on_b = ctx_b.channel_end(&chan_end_path_on_b)?;
    let upgrade_on_b = expect_upgrade(ctx_b, port_id_on_b, chan_id_on_b)?;
    let upgrade_on_a = msg.counterparty_upgrade;

    let fields_on_b = &upgrade_on_b.fields;
    let fields_on_a = &upgrade_on_a.fields;
    let incompatibility = if fields_on_a.ordering != fields_on_b.ordering
        || fields_on_a.version != fields_on_b.version
    {
        Some(UpgradeError::IncompatibleCounterpartyUpgrade {
            description: format!("counterparty settled on {fields_on_a}, expected {fields_on_b}"),
        })
    } else {
        upgrade_timeout_elapsed(ctx_b, &upgrade_on_a.timeout)?
    };

    if let Some(error) = incompatibility {
        return abort_upgrade(ctx_b, module, port_id_on_b, chan_id_on_b, chan_end_on_b, error);
    }

    // state changes
    {
        ctx_b.store_counterparty_upgrade(
            &CounterpartyUpgradePath::new(port_id_on_b, chan_id_on_b),
            upgrade_on_a,
        )?;

        chan_end_on_b.set_state(flush_state(ctx_b, port_id_on_b, chan_id_on_b)?);
        ctx_b.store_channel(&chan_end_path_on_b, chan_end_on_b.clone())?;
    }

    // emit events and logs
    {
        ctx_b.log_message("success: channel upgrade confirm".to_string())?;

        let core_event = IbcEvent::UpgradeConfirmChannel(UpgradeConfirm {
            attributes: UpgradeAttributes::new(port_id_on_b, chan_id_on_b, &chan_end_on_b),
            upgrade_fields: upgrade_on_b.fields,
        });
        ctx_b.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
        ctx_b.emit_ibc_event(core_event)?;
    }

    // Nothing is left in flight on either side.
    if chan_end_on_b.state == State::FlushComplete
        && msg.counterparty_chan_state == State::FlushComplete
    {
        commit_upgrade(ctx_b, module, port_id_on_b, chan_id_on_b, chan_end_on_b)?;
    }

    Ok(())
}

fn validate<Ctx>(ctx_b: &Ctx, msg: &MsgChannelUpgradeConfirm) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx_b.validate_message_signer(&msg.signer)?;

    let chan_end_path_on_b = ChannelEndPath::new(&msg.port_id_on_b, &msg.chan_id_on_b);
    let chan_end_on_b = ctx_b.channel_end(&chan_end_path_on_b)?;

    chan_end_on_b.verify_state_matches(&State::TryUpgrade)?;

    if !matches!(
        msg.counterparty_chan_state,
        State::Flushing | State::FlushComplete
    ) {
        return Err(ChannelError::InvalidState {
            expected: "Counterparty channel state must be FLUSHING or FLUSHCOMPLETE".to_string(),
            actual: msg.counterparty_chan_state.to_string(),
        }
        .into());
    }

    expect_upgrade(ctx_b, &msg.port_id_on_b, &msg.chan_id_on_b)?;

    let conn_end_on_b = ctx_b.connection_end(&chan_end_on_b.connection_hops()[0])?;
    conn_end_on_b.verify_state_matches(&ConnectionState::Open)?;

    let (port_id_on_a, chan_id_on_a) = counterparty_ids(&chan_end_on_b)?;

    // Verify proofs
    {
        let expected_chan_end_on_a = expected_counterparty_channel(
            &chan_end_on_b,
            &msg.port_id_on_b,
            &msg.chan_id_on_b,
            &conn_end_on_b,
            msg.counterparty_chan_state,
            chan_end_on_b.upgrade_sequence,
        )?;

        verify_counterparty_channel(
            ctx_b,
            &conn_end_on_b,
            &msg.proof_chan_end_on_a,
            &msg.proof_height_on_a,
            (&port_id_on_a, &chan_id_on_a),
            &expected_chan_end_on_a,
        )?;

        verify_counterparty_upgrade(
            ctx_b,
            &conn_end_on_b,
            &msg.proof_upgrade_on_a,
            &msg.proof_height_on_a,
            (&port_id_on_a, &chan_id_on_a),
            &msg.counterparty_upgrade,
        )?;
    }

    Ok(())
}
