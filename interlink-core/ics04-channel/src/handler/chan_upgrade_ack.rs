//! Protocol logic specific to processing `MsgChannelUpgradeAck` messages.

use interlink_core_channel_types::channel::State;
use interlink_core_channel_types::error::UpgradeError;
use interlink_core_channel_types::events::{UpgradeAck, UpgradeAttributes};
use interlink_core_channel_types::msgs::MsgChannelUpgradeAck;
use interlink_core_connection_types::State as ConnectionState;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::path::{
    ChannelEndPath, ChannelUpgradePath, CounterpartyUpgradePath, SeqSendPath,
};
use interlink_core_host::{ExecutionContext, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;

use crate::upgrade::{
    abort_upgrade, counterparty_ids, expect_upgrade, expected_counterparty_channel, flush_state,
    proposed_connection_matches, upgrade_timeout_elapsed, verify_counterparty_channel,
    verify_counterparty_upgrade,
};

pub fn chan_upgrade_ack_validate<ValCtx>(
    ctx_a: &ValCtx,
    msg: MsgChannelUpgradeAck,
) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    validate(ctx_a, &msg)
}

pub fn chan_upgrade_ack_execute<ExecCtx>(
    ctx_a: &mut ExecCtx,
    module: &mut dyn Module,
    msg: MsgChannelUpgradeAck,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let port_id_on_a = &msg.port_id_on_a;
    let chan_id_on_a = &msg.chan_id_on_a;
    let chan_end_path_on_a = ChannelEndPath::new(port_id_on_a, chan_id_on_a);
    let mut chan_end_on_a = ctx_a.channel_end(&chan_end_path_on_a)?;
    let mut upgrade_on_a = expect_upgrade(ctx_a, port_id_on_a, chan_id_on_a)?;
    let upgrade_on_b = msg.counterparty_upgrade;

    let incompatibility = if upgrade_on_a.fields.ordering != upgrade_on_b.fields.ordering {
        Some(UpgradeError::IncompatibleCounterpartyUpgrade {
            description: format!(
                "counterparty ordering {} differs from the proposed {}",
                upgrade_on_b.fields.ordering, upgrade_on_a.fields.ordering
            ),
        })
    } else if let Some(error) =
        proposed_connection_matches(ctx_a, &upgrade_on_a.fields, &upgrade_on_b.fields)?
    {
        Some(error)
    } else {
        upgrade_timeout_elapsed(ctx_a, &upgrade_on_b.timeout)?
    };

    if let Some(error) = incompatibility {
        return abort_upgrade(ctx_a, module, port_id_on_a, chan_id_on_a, chan_end_on_a, error);
    }

    let extras =
        match module.on_chan_upgrade_ack(port_id_on_a, chan_id_on_a, &upgrade_on_b.fields.version)
        {
            Ok(extras) => extras,
            Err(e) => {
                return abort_upgrade(
                    ctx_a,
                    module,
                    port_id_on_a,
                    chan_id_on_a,
                    chan_end_on_a,
                    UpgradeError::AppModule {
                        description: e.to_string(),
                    },
                )
            }
        };

    // state changes
    {
        upgrade_on_a.fields.version = upgrade_on_b.fields.version.clone();
        upgrade_on_a.next_sequence_send =
            ctx_a.get_next_sequence_send(&SeqSendPath::new(port_id_on_a, chan_id_on_a))?;

        ctx_a.store_channel_upgrade(
            &ChannelUpgradePath::new(port_id_on_a, chan_id_on_a),
            upgrade_on_a.clone(),
        )?;
        ctx_a.store_counterparty_upgrade(
            &CounterpartyUpgradePath::new(port_id_on_a, chan_id_on_a),
            upgrade_on_b,
        )?;

        chan_end_on_a.set_state(flush_state(ctx_a, port_id_on_a, chan_id_on_a)?);
        ctx_a.store_channel(&chan_end_path_on_a, chan_end_on_a.clone())?;
    }

    // emit events and logs
    {
        ctx_a.log_message("success: channel upgrade ack".to_string())?;

        let core_event = IbcEvent::UpgradeAckChannel(UpgradeAck {
            attributes: UpgradeAttributes::new(port_id_on_a, chan_id_on_a, &chan_end_on_a),
            upgrade_fields: upgrade_on_a.fields,
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

fn validate<Ctx>(ctx_a: &Ctx, msg: &MsgChannelUpgradeAck) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx_a.validate_message_signer(&msg.signer)?;

    let chan_end_path_on_a = ChannelEndPath::new(&msg.port_id_on_a, &msg.chan_id_on_a);
    let chan_end_on_a = ctx_a.channel_end(&chan_end_path_on_a)?;

    chan_end_on_a.verify_state_matches(&State::InitUpgrade)?;

    expect_upgrade(ctx_a, &msg.port_id_on_a, &msg.chan_id_on_a)?;

    msg.counterparty_upgrade.fields.validate_basic()?;

    let conn_end_on_a = ctx_a.connection_end(&chan_end_on_a.connection_hops()[0])?;
    conn_end_on_a.verify_state_matches(&ConnectionState::Open)?;

    let (port_id_on_b, chan_id_on_b) = counterparty_ids(&chan_end_on_a)?;

    // Verify proofs
    {
        let expected_chan_end_on_b = expected_counterparty_channel(
            &chan_end_on_a,
            &msg.port_id_on_a,
            &msg.chan_id_on_a,
            &conn_end_on_a,
            State::TryUpgrade,
            chan_end_on_a.upgrade_sequence,
        )?;

        verify_counterparty_channel(
            ctx_a,
            &conn_end_on_a,
            &msg.proof_chan_end_on_b,
            &msg.proof_height_on_b,
            (&port_id_on_b, &chan_id_on_b),
            &expected_chan_end_on_b,
        )?;

        verify_counterparty_upgrade(
            ctx_a,
            &conn_end_on_a,
            &msg.proof_upgrade_on_b,
            &msg.proof_height_on_b,
            (&port_id_on_b, &chan_id_on_b),
            &msg.counterparty_upgrade,
        )?;
    }

    Ok(())
}
