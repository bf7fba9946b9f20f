//! Protocol logic specific to processing `MsgChannelUpgradeOpen` messages.

use interlink_core_channel_types::channel::{Counterparty, State};
use interlink_core_channel_types::error::{ChannelError, UpgradeError};
use interlink_core_channel_types::msgs::MsgChannelUpgradeOpen;
use interlink_core_connection_types::State as ConnectionState;
use interlink_core_handler_types::error::ContextError;
use interlink_core_host::types::path::ChannelEndPath;
use interlink_core_host::{ExecutionContext, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;

use crate::upgrade::{
    commit_upgrade, counterparty_ids, expect_counterparty_upgrade, expect_upgrade,
    verify_counterparty_channel,
};

pub fn chan_upgrade_open_validate<ValCtx>(
    ctx: &ValCtx,
    msg: MsgChannelUpgradeOpen,
) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    validate(ctx, &msg)
}

pub fn chan_upgrade_open_execute<ExecCtx>(
    ctx: &mut ExecCtx,
    module: &mut dyn Module,
    msg: MsgChannelUpgradeOpen,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let chan_end = ctx.channel_end(&ChannelEndPath::new(&msg.port_id, &msg.chan_id))?;

    commit_upgrade(ctx, module, &msg.port_id, &msg.chan_id, chan_end)
}

fn validate<Ctx>(ctx: &Ctx, msg: &MsgChannelUpgradeOpen) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx.validate_message_signer(&msg.signer)?;

    let chan_end = ctx.channel_end(&ChannelEndPath::new(&msg.port_id, &msg.chan_id))?;

    chan_end.verify_state_matches(&State::FlushComplete)?;

    let upgrade = expect_upgrade(ctx, &msg.port_id, &msg.chan_id)?;
    let counterparty_upgrade = expect_counterparty_upgrade(ctx, &msg.port_id, &msg.chan_id)?;

    let conn_end = ctx.connection_end(&chan_end.connection_hops()[0])?;
    conn_end.verify_state_matches(&ConnectionState::Open)?;

    let cp_chan_end = &msg.counterparty_channel;

    cp_chan_end.verify_counterparty_matches(&Counterparty::new(
        msg.port_id.clone(),
        Some(msg.chan_id.clone()),
    ))?;

    match cp_chan_end.state {
        State::FlushComplete => {
            if cp_chan_end.upgrade_sequence != chan_end.upgrade_sequence {
                return Err(UpgradeError::UpgradeSequenceMismatch {
                    expected: chan_end.upgrade_sequence,
                    actual: cp_chan_end.upgrade_sequence,
                }
                .into());
            }
        }
        // The counterparty already committed, and may even have started
        // another upgrade since.
        State::Open | State::InitUpgrade => {
            if cp_chan_end.upgrade_sequence < chan_end.upgrade_sequence {
                return Err(UpgradeError::UpgradeSequenceMismatch {
                    expected: chan_end.upgrade_sequence,
                    actual: cp_chan_end.upgrade_sequence,
                }
                .into());
            }

            if cp_chan_end.ordering != upgrade.fields.ordering
                || cp_chan_end.version != upgrade.fields.version
                || cp_chan_end.connection_hops != counterparty_upgrade.fields.connection_hops
            {
                return Err(UpgradeError::IncompatibleCounterpartyUpgrade {
                    description: format!(
                        "counterparty channel {cp_chan_end} does not run the upgraded fields {}",
                        upgrade.fields
                    ),
                }
                .into());
            }
        }
        state => {
            return Err(ChannelError::InvalidState {
                expected: "Counterparty channel state must be FLUSHCOMPLETE, OPEN or INITUPGRADE"
                    .to_string(),
                actual: state.to_string(),
            }
            .into())
        }
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

    Ok(())
}
