//! Protocol logic specific to processing `MsgChannelUpgradeTry` messages.
//!
//! Problems the counterparty cannot fix by relaying again (an outdated
//! sequence, incompatible fields, an elapsed timeout, an application veto)
//! do not fail the message: they abort the attempt and leave an error
//! receipt, which the counterparty then proves to cancel its own side.

use interlink_core_channel_types::channel::{ChannelEnd, State};
use interlink_core_channel_types::error::UpgradeError;
use interlink_core_channel_types::events::{UpgradeAttributes, UpgradeTry};
use interlink_core_channel_types::msgs::MsgChannelUpgradeTry;
use interlink_core_channel_types::upgrade::{Upgrade, UpgradeFields};
use interlink_core_connection_types::State as ConnectionState;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::identifiers::Sequence;
use interlink_core_host::types::path::{ChannelEndPath, ChannelUpgradePath, SeqSendPath};
use interlink_core_host::{ExecutionContext, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;

use crate::upgrade::{
    abort_upgrade, counterparty_ids, expect_upgrade, expected_counterparty_channel,
    proposed_connection_matches, upgrade_precedence, upgrade_timeout_elapsed,
    verify_counterparty_channel, verify_counterparty_upgrade, write_error_receipt,
    CrossingProposal, UpgradePrecedence,
};

pub fn chan_upgrade_try_validate<ValCtx>(
    ctx_b: &ValCtx,
    msg: MsgChannelUpgradeTry,
) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    validate(ctx_b, &msg)

    // the module is consulted in execute only: a veto aborts the attempt
    // instead of failing the message.
}

pub fn chan_upgrade_try_execute<ExecCtx>(
    ctx_b: &mut ExecCtx,
    module: &mut dyn Module,
    msg: MsgChannelUpgradeTry,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let port_id_on_b = &msg.port_id_on_b;
    let chan_id_on_b = &msg.chan_id_on_b;
    let chan_end_path_on_b = ChannelEndPath::new(port_id_on_b, chan_id_on_b);
    let mut chan_end_on_b = ctx_b.channel_end(&chan_end_path_on_b)?;

    let crossing = chan_end_on_b.state == State::InitUpgrade;

    if !crossing && msg.counterparty_upgrade_sequence <= chan_end_on_b.upgrade_sequence {
        // Our own sequence goes into the receipt so that the counterparty
        // can fast-forward past it when it cancels.
        return write_error_receipt(
            ctx_b,
            port_id_on_b,
            chan_id_on_b,
            &chan_end_on_b,
            UpgradeError::OutdatedCounterpartyUpgrade {
                local_sequence: chan_end_on_b.upgrade_sequence,
                counterparty_sequence: msg.counterparty_upgrade_sequence,
            },
        );
    }

    if crossing_precedence(ctx_b, &msg, &chan_end_on_b)? == Some(UpgradePrecedence::Tie) {
        let sequence = chan_end_on_b.upgrade_sequence;

        return abort_upgrade(
            ctx_b,
            module,
            port_id_on_b,
            chan_id_on_b,
            chan_end_on_b,
            UpgradeError::IndistinguishableCrossingUpgrades { sequence },
        );
    }

    chan_end_on_b.upgrade_sequence = msg.counterparty_upgrade_sequence;

    let proposed_fields = UpgradeFields::new(
        msg.counterparty_upgrade_fields.ordering,
        msg.proposed_connection_hops.clone(),
        msg.counterparty_upgrade_fields.version.clone(),
    );

    if let Some(error) = incompatibility(ctx_b, &msg, crossing, &proposed_fields)? {
        return abort_upgrade(
            ctx_b,
            module,
            port_id_on_b,
            chan_id_on_b,
            chan_end_on_b,
            error,
        );
    }

    let (extras, version) = match module.on_chan_upgrade_try(
        port_id_on_b,
        chan_id_on_b,
        proposed_fields.ordering,
        &proposed_fields.connection_hops,
        &proposed_fields.version,
    ) {
        Ok(answer) => answer,
        Err(e) => {
            return abort_upgrade(
                ctx_b,
                module,
                port_id_on_b,
                chan_id_on_b,
                chan_end_on_b,
                UpgradeError::AppModule {
                    description: e.to_string(),
                },
            )
        }
    };

    let upgrade_fields = UpgradeFields::new(
        proposed_fields.ordering,
        proposed_fields.connection_hops,
        version,
    );

    // state changes
    {
        let next_seq_send_on_b =
            ctx_b.get_next_sequence_send(&SeqSendPath::new(port_id_on_b, chan_id_on_b))?;

        chan_end_on_b.set_state(State::TryUpgrade);
        ctx_b.store_channel(&chan_end_path_on_b, chan_end_on_b.clone())?;

        let upgrade = Upgrade::new(
            upgrade_fields.clone(),
            msg.counterparty_upgrade_timeout,
            next_seq_send_on_b,
        );
        ctx_b.store_channel_upgrade(&ChannelUpgradePath::new(port_id_on_b, chan_id_on_b), upgrade)?;
    }

    // emit events and logs
    {
        ctx_b.log_message("success: channel upgrade try".to_string())?;

        let core_event = IbcEvent::UpgradeTryChannel(UpgradeTry {
            attributes: UpgradeAttributes::new(port_id_on_b, chan_id_on_b, &chan_end_on_b),
            upgrade_fields,
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

/// Returns why chain B cannot go along with the proposal, if it cannot.
fn incompatibility<Ctx>(
    ctx_b: &Ctx,
    msg: &MsgChannelUpgradeTry,
    crossing: bool,
    proposed_fields: &UpgradeFields,
) -> Result<Option<UpgradeError>, ContextError>
where
    Ctx: ValidationContext,
{
    if crossing {
        let upgrade_on_b = expect_upgrade(ctx_b, &msg.port_id_on_b, &msg.chan_id_on_b)?;

        if upgrade_on_b.fields.ordering != proposed_fields.ordering {
            return Ok(Some(UpgradeError::IncompatibleCounterpartyUpgrade {
                description: format!(
                    "proposed ordering {} differs from the local proposal {}",
                    proposed_fields.ordering, upgrade_on_b.fields.ordering
                ),
            }));
        }
    }

    if let Some(error) =
        proposed_connection_matches(ctx_b, proposed_fields, &msg.counterparty_upgrade_fields)?
    {
        return Ok(Some(error));
    }

    upgrade_timeout_elapsed(ctx_b, &msg.counterparty_upgrade_timeout)
}

/// Compares the incoming proposal with the one chain B made itself, or
/// returns `None` when B has not proposed anything.
fn crossing_precedence<Ctx>(
    ctx_b: &Ctx,
    msg: &MsgChannelUpgradeTry,
    chan_end_on_b: &ChannelEnd,
) -> Result<Option<UpgradePrecedence>, ContextError>
where
    Ctx: ValidationContext,
{
    if chan_end_on_b.state != State::InitUpgrade {
        return Ok(None);
    }

    let upgrade_on_b = expect_upgrade(ctx_b, &msg.port_id_on_b, &msg.chan_id_on_b)?;
    let (port_id_on_a, chan_id_on_a) = counterparty_ids(chan_end_on_b)?;

    let local = CrossingProposal {
        sequence: chan_end_on_b.upgrade_sequence,
        fields: &upgrade_on_b.fields,
        port_id: &msg.port_id_on_b,
        channel_id: &msg.chan_id_on_b,
    };
    let remote = CrossingProposal {
        sequence: msg.counterparty_upgrade_sequence,
        fields: &msg.counterparty_upgrade_fields,
        port_id: &port_id_on_a,
        channel_id: &chan_id_on_a,
    };

    Ok(Some(upgrade_precedence(&local, &remote)))
}

fn validate<Ctx>(ctx_b: &Ctx, msg: &MsgChannelUpgradeTry) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx_b.validate_message_signer(&msg.signer)?;

    msg.validate_basic()?;

    let chan_end_path_on_b = ChannelEndPath::new(&msg.port_id_on_b, &msg.chan_id_on_b);
    let chan_end_on_b = ctx_b.channel_end(&chan_end_path_on_b)?;

    chan_end_on_b.verify_state_in(&[State::Open, State::InitUpgrade])?;

    let conn_end_on_b = ctx_b.connection_end(&chan_end_on_b.connection_hops()[0])?;
    conn_end_on_b.verify_state_matches(&ConnectionState::Open)?;

    let proposed_conn_end_on_b = ctx_b.connection_end(&msg.proposed_connection_hops[0])?;
    proposed_conn_end_on_b.verify_state_matches(&ConnectionState::Open)?;

    let (port_id_on_a, chan_id_on_a) = counterparty_ids(&chan_end_on_b)?;

    if crossing_precedence(ctx_b, msg, &chan_end_on_b)? == Some(UpgradePrecedence::Local) {
        return Err(UpgradeError::UpgradeSequenceLost {
            local_sequence: chan_end_on_b.upgrade_sequence,
            counterparty_sequence: msg.counterparty_upgrade_sequence,
        }
        .into());
    }

    // Verify proofs
    {
        let expected_chan_end_on_a = expected_counterparty_channel(
            &chan_end_on_b,
            &msg.port_id_on_b,
            &msg.chan_id_on_b,
            &conn_end_on_b,
            State::InitUpgrade,
            msg.counterparty_upgrade_sequence,
        )?;

        verify_counterparty_channel(
            ctx_b,
            &conn_end_on_b,
            &msg.proof_chan_end_on_a,
            &msg.proof_height_on_a,
            (&port_id_on_a, &chan_id_on_a),
            &expected_chan_end_on_a,
        )?;

        // A proposal that has not started flushing has no frozen send sequence.
        let expected_upgrade_on_a = Upgrade::new(
            msg.counterparty_upgrade_fields.clone(),
            msg.counterparty_upgrade_timeout,
            Sequence::from(0),
        );

        verify_counterparty_upgrade(
            ctx_b,
            &conn_end_on_b,
            &msg.proof_upgrade_on_a,
            &msg.proof_height_on_a,
            (&port_id_on_a, &chan_id_on_a),
            &expected_upgrade_on_a,
        )?;
    }

    Ok(())
}
