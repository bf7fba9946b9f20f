//! Bookkeeping shared by the upgrade handlers and by the packet handlers that
//! drive a channel through flushing.
//!
//! An upgrade attempt always ends in one of two ways: [`commit_upgrade`]
//! puts the negotiated fields in force, or [`abort_upgrade`] puts the channel
//! back to `OPEN` on its old fields and leaves an error receipt behind for
//! the counterparty to cancel with.

use core::cmp::{Ordering, Reverse};

use interlink_core_channel_types::channel::{ChannelEnd, Counterparty, Order, State};
use interlink_core_channel_types::error::{ChannelError, UpgradeError};
use interlink_core_channel_types::events::{
    UpgradeAttributes, UpgradeError as UpgradeErrorEvent, UpgradeOpen,
};
use interlink_core_channel_types::upgrade::{ErrorReceipt, Upgrade, UpgradeFields, UpgradeTimeout};
use interlink_core_client_types::Height;
use interlink_core_commitment_types::commitment::CommitmentProofBytes;
use interlink_core_connection_types::error::ConnectionError;
use interlink_core_connection_types::{ConnectionEnd, State as ConnectionState};
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::events::{IbcEvent, MessageEvent};
use interlink_core_host::types::identifiers::{ChannelId, PortId};
use interlink_core_host::types::path::{
    ChannelEndPath, ChannelUpgradePath, CounterpartyUpgradePath, Path, SeqAckPath, SeqRecvPath,
    UpgradeErrorPath,
};
use interlink_core_host::{ExecutionContext, ProofVerifier, ValidationContext};
use interlink_core_router::module::Module;
use interlink_primitives::prelude::*;
use interlink_primitives::proto::Protobuf;

/// Which of two crossing upgrade proposals goes ahead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradePrecedence {
    Local,
    Remote,
    /// Nothing tells the two proposals apart. Both ends abort.
    Tie,
}

/// One of two upgrade proposals that crossed on the wire, together with the
/// channel end that made it.
#[derive(Clone, Copy, Debug)]
pub struct CrossingProposal<'a> {
    pub sequence: u64,
    pub fields: &'a UpgradeFields,
    pub port_id: &'a PortId,
    pub channel_id: &'a ChannelId,
}

impl CrossingProposal<'_> {
    /// The lower key wins. Connection hops are left out: each chain names
    /// the connection by its own identifier.
    fn precedence_key(&self) -> (Reverse<u64>, &str, i32, &str, &str) {
        (
            Reverse(self.sequence),
            self.fields.version.as_str(),
            self.fields.ordering as i32,
            self.port_id.as_str(),
            self.channel_id.as_str(),
        )
    }
}

/// Decides between two proposals that crossed on the wire.
///
/// The higher upgrade sequence wins. Then the proposal whose version sorts
/// lower wins, then the one whose ordering has the lower code, and last the
/// end whose `(port, channel)` sorts lower. Swapping `local` and `remote`
/// always swaps `Local` and `Remote`, so both chains reach the same
/// verdict. Proposals equal on all of these yield `Tie`.
pub fn upgrade_precedence(
    local: &CrossingProposal<'_>,
    remote: &CrossingProposal<'_>,
) -> UpgradePrecedence {
    match local.precedence_key().cmp(&remote.precedence_key()) {
        Ordering::Less => UpgradePrecedence::Local,
        Ordering::Greater => UpgradePrecedence::Remote,
        Ordering::Equal => UpgradePrecedence::Tie,
    }
}

/// Checks a proposed set of upgrade fields against the channel it would
/// replace.
///
/// Identical fields are rejected, and the proposed connection must exist
/// and be open.
pub fn validate_upgrade_fields<Ctx>(
    ctx: &Ctx,
    proposed: &UpgradeFields,
    existing: &ChannelEnd,
) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    if *proposed == existing.upgrade_fields() {
        return Err(UpgradeError::UpgradeFieldsUnchanged.into());
    }

    proposed.validate_basic()?;

    let conn_end = ctx.connection_end(&proposed.connection_hops[0])?;
    conn_end.verify_state_matches(&ConnectionState::Open)?;

    Ok(())
}

/// Returns the upgrade in progress on `(port_id, channel_id)`.
pub(crate) fn expect_upgrade<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<Upgrade, ContextError>
where
    Ctx: ValidationContext,
{
    ctx.channel_upgrade(&ChannelUpgradePath::new(port_id, channel_id))?
        .ok_or_else(|| {
            UpgradeError::UpgradeNotFound {
                port_id: port_id.clone(),
                channel_id: channel_id.clone(),
            }
            .into()
        })
}

/// Returns the counterparty upgrade learnt for `(port_id, channel_id)`.
pub(crate) fn expect_counterparty_upgrade<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<Upgrade, ContextError>
where
    Ctx: ValidationContext,
{
    ctx.counterparty_upgrade(&CounterpartyUpgradePath::new(port_id, channel_id))?
        .ok_or_else(|| {
            UpgradeError::CounterpartyUpgradeNotFound {
                port_id: port_id.clone(),
                channel_id: channel_id.clone(),
            }
            .into()
        })
}

/// Whether the local clock has passed `timeout`.
pub(crate) fn upgrade_timeout_elapsed<Ctx>(
    ctx: &Ctx,
    timeout: &UpgradeTimeout,
) -> Result<Option<UpgradeError>, ContextError>
where
    Ctx: ValidationContext,
{
    let height = ctx.host_height()?;
    let timestamp = ctx.host_timestamp()?;

    if timeout.has_elapsed(height, &timestamp) {
        return Ok(Some(UpgradeError::UpgradeTimeoutElapsed {
            timeout: *timeout,
            height,
            timestamp,
        }));
    }

    Ok(None)
}

/// The state a channel moves to once it stops sending: `FLUSHCOMPLETE` when
/// nothing it sent is still awaiting an acknowledgement or timeout,
/// `FLUSHING` otherwise.
pub(crate) fn flush_state<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<State, ContextError>
where
    Ctx: ValidationContext,
{
    let in_flight = ctx.packet_commitment_sequences(&ChannelEndPath::new(port_id, channel_id))?;

    if in_flight.is_empty() {
        Ok(State::FlushComplete)
    } else {
        Ok(State::Flushing)
    }
}

/// The channel end the counterparty must hold while it takes part in the
/// same upgrade attempt as `chan_end`.
pub(crate) fn expected_counterparty_channel(
    chan_end: &ChannelEnd,
    port_id: &PortId,
    channel_id: &ChannelId,
    conn_end: &ConnectionEnd,
    state: State,
    upgrade_sequence: u64,
) -> Result<ChannelEnd, ContextError> {
    let conn_id_on_cp = conn_end
        .counterparty()
        .connection_id()
        .ok_or(ConnectionError::MissingCounterpartyConnectionId)?;

    Ok(ChannelEnd::new(
        state,
        chan_end.ordering,
        Counterparty::new(port_id.clone(), Some(channel_id.clone())),
        vec![conn_id_on_cp.clone()],
        chan_end.version.clone(),
        upgrade_sequence,
    )?)
}

/// Returns the counterparty `(port, channel)` of a channel end.
pub(crate) fn counterparty_ids(chan_end: &ChannelEnd) -> Result<(PortId, ChannelId), ContextError> {
    let port_id = chan_end.counterparty().port_id().clone();
    let channel_id = chan_end
        .counterparty()
        .channel_id()
        .ok_or(ChannelError::MissingCounterparty)?
        .clone();

    Ok((port_id, channel_id))
}

/// Verifies that the counterparty stores `expected` as its channel end.
pub(crate) fn verify_counterparty_channel<Ctx>(
    ctx: &Ctx,
    conn_end: &ConnectionEnd,
    proof: &CommitmentProofBytes,
    proof_height: &Height,
    (port_id_on_cp, chan_id_on_cp): (&PortId, &ChannelId),
    expected: &ChannelEnd,
) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    let client_id = conn_end.client_id();
    let verifier = ctx.proof_verifier();

    verifier.validate_proof_height(client_id, proof_height)?;

    verifier
        .verify_membership(
            client_id,
            conn_end.counterparty().prefix(),
            proof,
            proof_height,
            Path::ChannelEnd(ChannelEndPath::new(port_id_on_cp, chan_id_on_cp)),
            expected.clone().encode_vec(),
        )
        .map_err(ChannelError::VerifyChannelFailed)?;

    Ok(())
}

/// Verifies that the counterparty stores `expected` as its upgrade.
pub(crate) fn verify_counterparty_upgrade<Ctx>(
    ctx: &Ctx,
    conn_end: &ConnectionEnd,
    proof: &CommitmentProofBytes,
    proof_height: &Height,
    (port_id_on_cp, chan_id_on_cp): (&PortId, &ChannelId),
    expected: &Upgrade,
) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    let client_id = conn_end.client_id();
    let verifier = ctx.proof_verifier();

    verifier.validate_proof_height(client_id, proof_height)?;

    verifier
        .verify_membership(
            client_id,
            conn_end.counterparty().prefix(),
            proof,
            proof_height,
            Path::ChannelUpgrade(ChannelUpgradePath::new(port_id_on_cp, chan_id_on_cp)),
            expected.clone().encode_vec(),
        )
        .map_err(UpgradeError::VerifyUpgradeFailed)?;

    Ok(())
}

/// Checks that the connection the counterparty proposed and the connection
/// this end proposed are the two ends of the same connection.
pub(crate) fn proposed_connection_matches<Ctx>(
    ctx: &Ctx,
    local: &UpgradeFields,
    remote: &UpgradeFields,
) -> Result<Option<UpgradeError>, ContextError>
where
    Ctx: ValidationContext,
{
    let conn_end = ctx.connection_end(&local.connection_hops[0])?;

    if conn_end.counterparty().connection_id() != Some(&remote.connection_hops[0]) {
        return Ok(Some(UpgradeError::IncompatibleCounterpartyUpgrade {
            description: format!(
                "connection {} does not face the proposed counterparty connection {}",
                local.connection_hops[0], remote.connection_hops[0]
            ),
        }));
    }

    Ok(None)
}

/// Writes an error receipt for the current upgrade sequence without
/// touching the channel.
pub(crate) fn write_error_receipt<ExecCtx>(
    ctx: &mut ExecCtx,
    port_id: &PortId,
    channel_id: &ChannelId,
    chan_end: &ChannelEnd,
    error: UpgradeError,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let error_receipt = ErrorReceipt::new(chan_end.upgrade_sequence, &error);

    ctx.store_upgrade_error_receipt(
        &UpgradeErrorPath::new(port_id, channel_id),
        error_receipt.clone(),
    )?;

    ctx.log_message(format!("channel upgrade error: {error}"))?;
    ctx.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
    ctx.emit_ibc_event(IbcEvent::UpgradeErrorChannel(UpgradeErrorEvent {
        attributes: UpgradeAttributes::new(port_id, channel_id, chan_end),
        channel_state: chan_end.state,
        error_receipt,
    }))?;

    Ok(())
}

/// Abandons the upgrade attempt on `(port_id, channel_id)`.
///
/// The channel goes back to `OPEN` on the fields it had before the attempt,
/// both upgrade records are dropped, and an error receipt is written for the
/// attempt's sequence. The upgrade sequence is then bumped so the next
/// attempt starts strictly above the aborted one. Packet sequence counters
/// are left as they are.
pub(crate) fn abort_upgrade<ExecCtx>(
    ctx: &mut ExecCtx,
    module: &mut dyn Module,
    port_id: &PortId,
    channel_id: &ChannelId,
    mut chan_end: ChannelEnd,
    error: UpgradeError,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let error_receipt = ErrorReceipt::new(chan_end.upgrade_sequence, &error);

    // state changes
    {
        chan_end.set_state(State::Open);
        chan_end.upgrade_sequence += 1;

        ctx.store_channel(&ChannelEndPath::new(port_id, channel_id), chan_end.clone())?;
        ctx.delete_channel_upgrade(&ChannelUpgradePath::new(port_id, channel_id))?;
        ctx.delete_counterparty_upgrade(&CounterpartyUpgradePath::new(port_id, channel_id))?;
        ctx.store_upgrade_error_receipt(
            &UpgradeErrorPath::new(port_id, channel_id),
            error_receipt.clone(),
        )?;
    }

    let extras = module.on_chan_upgrade_restore(port_id, channel_id);

    // emit events and logs
    {
        ctx.log_message(format!("channel upgrade aborted: {error}"))?;

        ctx.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
        ctx.emit_ibc_event(IbcEvent::UpgradeErrorChannel(UpgradeErrorEvent {
            attributes: UpgradeAttributes::new(port_id, channel_id, &chan_end),
            channel_state: chan_end.state,
            error_receipt,
        }))?;

        for module_event in extras.events {
            ctx.emit_ibc_event(IbcEvent::Module(module_event))?;
        }

        for log_message in extras.log {
            ctx.log_message(log_message)?;
        }
    }

    Ok(())
}

/// Puts the negotiated upgrade fields in force and reopens the channel.
pub(crate) fn commit_upgrade<ExecCtx>(
    ctx: &mut ExecCtx,
    module: &mut dyn Module,
    port_id: &PortId,
    channel_id: &ChannelId,
    mut chan_end: ChannelEnd,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let upgrade = expect_upgrade(ctx, port_id, channel_id)?;
    let counterparty_upgrade = expect_counterparty_upgrade(ctx, port_id, channel_id)?;

    // state changes
    {
        // An ordered channel picks up its counters where the unordered one
        // stopped sending on each side.
        if chan_end.ordering == Order::Unordered && upgrade.fields.ordering == Order::Ordered {
            ctx.store_next_sequence_recv(
                &SeqRecvPath::new(port_id, channel_id),
                counterparty_upgrade.next_sequence_send,
            )?;
            ctx.store_next_sequence_ack(
                &SeqAckPath::new(port_id, channel_id),
                upgrade.next_sequence_send,
            )?;
        }

        chan_end.apply_upgrade_fields(upgrade.fields.clone());
        chan_end.set_state(State::Open);

        ctx.store_channel(&ChannelEndPath::new(port_id, channel_id), chan_end.clone())?;
        ctx.delete_channel_upgrade(&ChannelUpgradePath::new(port_id, channel_id))?;
        ctx.delete_counterparty_upgrade(&CounterpartyUpgradePath::new(port_id, channel_id))?;
    }

    let extras = module.on_chan_upgrade_open(
        port_id,
        channel_id,
        chan_end.ordering,
        &chan_end.connection_hops,
        &chan_end.version,
    );

    // emit events and logs
    {
        ctx.log_message("success: channel upgrade open".to_string())?;

        ctx.emit_ibc_event(IbcEvent::Message(MessageEvent::Channel))?;
        ctx.emit_ibc_event(IbcEvent::UpgradeOpenChannel(UpgradeOpen {
            attributes: UpgradeAttributes::new(port_id, channel_id, &chan_end),
            upgrade_fields: upgrade.fields,
        }))?;

        for module_event in extras.events {
            ctx.emit_ibc_event(IbcEvent::Module(module_event))?;
        }

        for log_message in extras.log {
            ctx.log_message(log_message)?;
        }
    }

    Ok(())
}

/// Called after an acknowledgement or timeout removed a packet commitment
/// from a `FLUSHING` channel.
///
/// Aborts if the local clock passed the counterparty's upgrade timeout,
/// otherwise moves to `FLUSHCOMPLETE` once the last commitment is gone.
pub(crate) fn complete_flush_if_done<ExecCtx>(
    ctx: &mut ExecCtx,
    module: &mut dyn Module,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<(), ContextError>
where
    ExecCtx: ExecutionContext,
{
    let chan_end_path = ChannelEndPath::new(port_id, channel_id);
    let mut chan_end = ctx.channel_end(&chan_end_path)?;

    if chan_end.state != State::Flushing {
        return Ok(());
    }

    let counterparty_upgrade = expect_counterparty_upgrade(ctx, port_id, channel_id)?;

    if let Some(error) = upgrade_timeout_elapsed(ctx, &counterparty_upgrade.timeout)? {
        return abort_upgrade(ctx, module, port_id, channel_id, chan_end, error);
    }

    if flush_state(ctx, port_id, channel_id)? == State::FlushComplete {
        chan_end.set_state(State::FlushComplete);
        ctx.store_channel(&chan_end_path, chan_end)?;
        ctx.log_message(format!(
            "channel ({port_id}, {channel_id}) finished flushing"
        ))?;
    }

    Ok(())
}
