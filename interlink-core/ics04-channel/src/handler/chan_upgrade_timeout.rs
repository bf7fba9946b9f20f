//! Protocol logic specific to processing `MsgChannelUpgradeTimeout` messages.

use interlink_core_channel_types::channel::{Counterparty, State};
use interlink_core_channel_types::error::UpgradeError;
use interlink_core_channel_types::events::{UpgradeAttributes, UpgradeTimeout};
use interlink_core_channel_types::msgs::MsgChannelUpgradeTimeout;
use interlink_core_connection_types::State as ConnectionState;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::path::ChannelEndPath;
use interlink_core_host::{ExecutionContext, ProofVerifier, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;

use crate::upgrade::{abort_upgrade, counterparty_ids, expect_upgrade, verify_counterparty_channel};

pub fn chan_upgrade_timeout_validate<ValCtx>(
    ctx: &ValCtx,
    msg: MsgChannelUpgradeTimeout,
) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    validate(ctx, &msg)
}

pub fn chan_upgrade_timeout_execute<ExecCtx>(
    ctx: &mut ExecCtx,
    module: &mut dyn Module,
    msg: MsgChannelUpgradeTimeout,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let chan_end_path = ChannelEndPath::new(&msg.port_id, &msg.chan_id);
    let chan_end = ctx.channel_end(&chan_end_path)?;
    let upgrade = expect_upgrade(ctx, &msg.port_id, &msg.chan_id)?;

    let conn_end = ctx.connection_end(&chan_end.connection_hops()[0])?;
    let timestamp = ctx
        .proof_verifier()
        .consensus_timestamp(conn_end.client_id(), &msg.proof_height_on_cp)?;

    abort_upgrade(
        ctx,
        module,
        &msg.port_id,
        &msg.chan_id,
        chan_end,
        UpgradeError::UpgradeTimeoutElapsed {
            timeout: upgrade.timeout,
            height: msg.proof_height_on_cp,
            timestamp,
        },
    )?;

    // emit events and logs
    {
        let chan_end = ctx.channel_end(&chan_end_path)?;

        ctx.log_message("success: channel upgrade timeout".to_string())?;

        let core_event = IbcEvent::UpgradeTimeoutChannel(UpgradeTimeout {
            attributes: UpgradeAttributes::new(&msg.port_id, &msg.chan_id, &chan_end),
        });
        ctx.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
        ctx.emit_ibc_event(core_event)?;
    }

    Ok(())
}

fn validate<Ctx>(ctx: &Ctx, msg: &MsgChannelUpgradeTimeout) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx.validate_message_signer(&msg.signer)?;

    let chan_end = ctx.channel_end(&ChannelEndPath::new(&msg.port_id, &msg.chan_id))?;

    chan_end.verify_state_in(&[
        State::InitUpgrade,
        State::TryUpgrade,
        State::Flushing,
        State::FlushComplete,
    ])?;

    let upgrade = expect_upgrade(ctx, &msg.port_id, &msg.chan_id)?;

    let conn_end = ctx.connection_end(&chan_end.connection_hops()[0])?;
    conn_end.verify_state_matches(&ConnectionState::Open)?;

    let cp_chan_end = &msg.counterparty_channel;

    cp_chan_end.verify_counterparty_matches(&Counterparty::new(
        msg.port_id.clone(),
        Some(msg.chan_id.clone()),
    ))?;

    // Too late to time out once the counterparty has flushed or committed.
    let flushed = cp_chan_end.state == State::FlushComplete
        && cp_chan_end.upgrade_sequence == chan_end.upgrade_sequence;
    let committed = cp_chan_end.state == State::Open
        && cp_chan_end.upgrade_sequence >= chan_end.upgrade_sequence
        && cp_chan_end.ordering == upgrade.fields.ordering
        && cp_chan_end.version == upgrade.fields.version;

    if flushed || committed {
        return Err(UpgradeError::CounterpartyUpgradeCommitted {
            description: format!(
                "counterparty channel is {} at upgrade sequence {}",
                cp_chan_end.state, cp_chan_end.upgrade_sequence
            ),
        }
        .into());
    }

    // Verify proofs
    {
        let client_id = conn_end.client_id();
        let verifier = ctx.proof_verifier();

        verifier.validate_proof_height(client_id, &msg.proof_height_on_cp)?;

        let timestamp_on_cp = verifier.consensus_timestamp(client_id, &msg.proof_height_on_cp)?;

        if !upgrade
            .timeout
            .has_elapsed(msg.proof_height_on_cp, &timestamp_on_cp)
        {
            return Err(UpgradeError::UpgradeTimeoutNotReached {
                timeout: upgrade.timeout,
                height: msg.proof_height_on_cp,
                timestamp: timestamp_on_cp,
            }
            .into());
        }

        let (port_id_on_cp, chan_id_on_cp) = counterparty_ids(&chan_end)?;

        verify_counterparty_channel(
            ctx,
            &conn_end,
            &msg.proof_chan_end_on_cp,
            &msg.proof_height_on_cp,
            (&port_id_on_cp, &chan_id_on_cp),
            cp_chan_end,
        )?;
    }

    Ok(())
}
