//! Protocol logic specific to processing `MsgChannelUpgradeCancel` messages.

use interlink_core_channel_types::channel::State;
use interlink_core_channel_types::error::UpgradeError;
use interlink_core_channel_types::events::{UpgradeAttributes, UpgradeCancelled};
use interlink_core_channel_types::msgs::MsgChannelUpgradeCancel;
use interlink_core_connection_types::State as ConnectionState;
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::path::{ChannelEndPath, Path, UpgradeErrorPath};
use interlink_core_host::{ExecutionContext, ProofVerifier, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;
use interlink_primitives::proto::Protobuf;

use crate::upgrade::{abort_upgrade, counterparty_ids, expect_upgrade};

pub fn chan_upgrade_cancel_validate<ValCtx>(
    ctx: &ValCtx,
    msg: MsgChannelUpgradeCancel,
) -> Result<(), ContextError>
where
    ValCtx: ValidationContext,
{
    validate(ctx, &msg)
}

pub fn chan_upgrade_cancel_execute<ExecCtx>(
    ctx: &mut ExecCtx,
    module: &mut dyn Module,
    msg: MsgChannelUpgradeCancel,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let chan_end_path = ChannelEndPath::new(&msg.port_id, &msg.chan_id);
    let mut chan_end = ctx.channel_end(&chan_end_path)?;

    // Jump to the counterparty's sequence so the next attempt lands above
    // both of them.
    if msg.error_receipt.sequence > chan_end.upgrade_sequence {
        chan_end.upgrade_sequence = msg.error_receipt.sequence;
    }

    abort_upgrade(
        ctx,
        module,
        &msg.port_id,
        &msg.chan_id,
        chan_end,
        UpgradeError::UpgradeCancelled {
            sequence: msg.error_receipt.sequence,
        },
    )?;

    // emit events and logs
    {
        let chan_end = ctx.channel_end(&chan_end_path)?;

        ctx.log_message("success: channel upgrade cancel".to_string())?;

        let core_event = IbcEvent::UpgradeCancelledChannel(UpgradeCancelled {
            attributes: UpgradeAttributes::new(&msg.port_id, &msg.chan_id, &chan_end),
        });
        ctx.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
        ctx.emit_ibc_event(core_event)?;
    }

    Ok(())
}

fn validate<Ctx>(ctx: &Ctx, msg: &MsgChannelUpgradeCancel) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    ctx.validate_message_signer(&msg.signer)?;

    let chan_end = ctx.channel_end(&ChannelEndPath::new(&msg.port_id, &msg.chan_id))?;

    expect_upgrade(ctx, &msg.port_id, &msg.chan_id)?;

    let receipt_sequence = msg.error_receipt.sequence;

    // A flushed channel can only be cancelled by the receipt of this very
    // attempt; older attempts no longer concern it.
    let sequence_accepted = if chan_end.state == State::FlushComplete {
        receipt_sequence == chan_end.upgrade_sequence
    } else {
        receipt_sequence >= chan_end.upgrade_sequence
    };

    if !sequence_accepted {
        return Err(UpgradeError::InvalidErrorReceiptSequence {
            receipt_sequence,
            upgrade_sequence: chan_end.upgrade_sequence,
        }
        .into());
    }

    let conn_end = ctx.connection_end(&chan_end.connection_hops()[0])?;
    conn_end.verify_state_matches(&ConnectionState::Open)?;

    let (port_id_on_cp, chan_id_on_cp) = counterparty_ids(&chan_end)?;

    // Verify proofs
    {
        let client_id = conn_end.client_id();
        let verifier = ctx.proof_verifier();

        verifier.validate_proof_height(client_id, &msg.proof_height)?;

        verifier
            .verify_membership(
                client_id,
                conn_end.counterparty().prefix(),
                &msg.proof_error_receipt,
                &msg.proof_height,
                Path::UpgradeError(UpgradeErrorPath::new(&port_id_on_cp, &chan_id_on_cp)),
                msg.error_receipt.clone().encode_vec(),
            )
            .map_err(UpgradeError::VerifyUpgradeFailed)?;
    }

    Ok(())
}
