use interlink_core_channel::handler::{
    acknowledgement_packet_execute, acknowledgement_packet_validate, chan_close_confirm_execute,
    chan_close_confirm_validate, chan_close_init_execute, chan_close_init_validate,
    chan_open_ack_execute, chan_open_ack_validate, chan_open_confirm_execute,
    chan_open_confirm_validate, chan_open_init_execute, chan_open_init_validate,
    chan_open_try_execute, chan_open_try_validate, chan_upgrade_ack_execute,
    chan_upgrade_ack_validate, chan_upgrade_cancel_execute, chan_upgrade_cancel_validate,
    chan_upgrade_confirm_execute, chan_upgrade_confirm_validate, chan_upgrade_init_execute,
    chan_upgrade_init_validate, chan_upgrade_open_execute, chan_upgrade_open_validate,
    chan_upgrade_timeout_execute, chan_upgrade_timeout_validate, chan_upgrade_try_execute,
    chan_upgrade_try_validate, recv_packet_execute, recv_packet_validate, timeout_packet_execute,
    timeout_packet_validate, TimeoutMsgType,
};
use interlink_core_channel::types::msgs::{
    channel_msg_to_port_id, packet_msg_to_port_id, upgrade_msg_to_port_id, ChannelMsg, PacketMsg,
    UpgradeMsg,
};
use interlink_core_handler_types::error::ContextError;
use interlink_core_handler_types::msgs::MsgEnvelope;
use interlink_core_host::types::identifiers::PortId;
use interlink_core_host::{ExecutionContext, ValidationContext};
use interlink_core_router::module::Module;
use interlink_core_router::router::Router;
use interlink_core_router::types::error::RouterError;

/// Entrypoint which performs both validation and message execution
pub fn dispatch<Ctx>(
    ctx: &mut Ctx,
    router: &mut impl Router,
    msg: MsgEnvelope,
) -> Result<(), ContextError>
where
    Ctx: ExecutionContext,
{
    validate(ctx, router, msg.clone())?;
    execute(ctx, router, msg)
}

/// Entrypoint which only performs message validation
///
/// If a transaction contains `n` messages `m_1` ... `m_n`, then
/// they MUST be processed as follows:
///     validate(m_1), execute(m_1), ..., validate(m_n), execute(m_n)
/// That is, the state transition of message `i` must be applied before
/// message `i+1` is validated. This is equivalent to calling
/// `dispatch()` on each successively.
pub fn validate<Ctx>(ctx: &Ctx, router: &impl Router, msg: MsgEnvelope) -> Result<(), ContextError>
where
    Ctx: ValidationContext,
{
    match msg {
        MsgEnvelope::Channel(msg) => {
            let module = route(router, channel_msg_to_port_id(&msg))?;

            match msg {
                ChannelMsg::OpenInit(msg) => chan_open_init_validate(ctx, module, msg),
                ChannelMsg::OpenTry(msg) => chan_open_try_validate(ctx, module, msg),
                ChannelMsg::OpenAck(msg) => chan_open_ack_validate(ctx, module, msg),
                ChannelMsg::OpenConfirm(msg) => chan_open_confirm_validate(ctx, module, msg),
                ChannelMsg::CloseInit(msg) => chan_close_init_validate(ctx, module, msg),
                ChannelMsg::CloseConfirm(msg) => chan_close_confirm_validate(ctx, module, msg),
            }
        }
        MsgEnvelope::Packet(msg) => {
            let module = route(router, packet_msg_to_port_id(&msg))?;

            match msg {
                PacketMsg::Recv(msg) => recv_packet_validate(ctx, msg),
                PacketMsg::Ack(msg) => acknowledgement_packet_validate(ctx, module, msg),
                PacketMsg::Timeout(msg) => {
                    timeout_packet_validate(ctx, module, TimeoutMsgType::Timeout(msg))
                }
                PacketMsg::TimeoutOnClose(msg) => {
                    timeout_packet_validate(ctx, module, TimeoutMsgType::TimeoutOnClose(msg))
                }
            }
        }
        MsgEnvelope::Upgrade(msg) => {
            let module = route(router, upgrade_msg_to_port_id(&msg))?;

            // Past init, the module only gets a say in execute, where its
            // veto aborts the attempt instead of failing the message.
            match msg {
                UpgradeMsg::Init(msg) => chan_upgrade_init_validate(ctx, module, msg),
                UpgradeMsg::Try(msg) => chan_upgrade_try_validate(ctx, msg),
                UpgradeMsg::Ack(msg) => chan_upgrade_ack_validate(ctx, msg),
                UpgradeMsg::Confirm(msg) => chan_upgrade_confirm_validate(ctx, msg),
                UpgradeMsg::Open(msg) => chan_upgrade_open_validate(ctx, msg),
                UpgradeMsg::Cancel(msg) => chan_upgrade_cancel_validate(ctx, msg),
                UpgradeMsg::Timeout(msg) => chan_upgrade_timeout_validate(ctx, msg),
            }
        }
    }
}

/// Entrypoint which only performs message execution
pub fn execute<Ctx>(
    ctx: &mut Ctx,
    router: &mut impl Router,
    msg: MsgEnvelope,
) -> Result<(), ContextError>
where
    Ctx: ExecutionContext,
{
    match msg {
        MsgEnvelope::Channel(msg) => {
            let module = route_mut(router, channel_msg_to_port_id(&msg))?;

            match msg {
                ChannelMsg::OpenInit(msg) => chan_open_init_execute(ctx, module, msg),
                ChannelMsg::OpenTry(msg) => chan_open_try_execute(ctx, module, msg),
                ChannelMsg::OpenAck(msg) => chan_open_ack_execute(ctx, module, msg),
                ChannelMsg::OpenConfirm(msg) => chan_open_confirm_execute(ctx, module, msg),
                ChannelMsg::CloseInit(msg) => chan_close_init_execute(ctx, module, msg),
                ChannelMsg::CloseConfirm(msg) => chan_close_confirm_execute(ctx, module, msg),
            }
        }
        MsgEnvelope::Packet(msg) => {
            let module = route_mut(router, packet_msg_to_port_id(&msg))?;

            match msg {
                PacketMsg::Recv(msg) => recv_packet_execute(ctx, module, msg),
                PacketMsg::Ack(msg) => acknowledgement_packet_execute(ctx, module, msg),
                PacketMsg::Timeout(msg) => {
                    timeout_packet_execute(ctx, module, TimeoutMsgType::Timeout(msg))
                }
                PacketMsg::TimeoutOnClose(msg) => {
                    timeout_packet_execute(ctx, module, TimeoutMsgType::TimeoutOnClose(msg))
                }
            }
        }
        MsgEnvelope::Upgrade(msg) => {
            let module = route_mut(router, upgrade_msg_to_port_id(&msg))?;

            match msg {
                UpgradeMsg::Init(msg) => chan_upgrade_init_execute(ctx, module, msg),
                UpgradeMsg::Try(msg) => chan_upgrade_try_execute(ctx, module, msg),
                UpgradeMsg::Ack(msg) => chan_upgrade_ack_execute(ctx, module, msg),
                UpgradeMsg::Confirm(msg) => chan_upgrade_confirm_execute(ctx, module, msg),
                UpgradeMsg::Open(msg) => chan_upgrade_open_execute(ctx, module, msg),
                UpgradeMsg::Cancel(msg) => chan_upgrade_cancel_execute(ctx, module, msg),
                UpgradeMsg::Timeout(msg) => chan_upgrade_timeout_execute(ctx, module, msg),
            }
        }
    }
}

fn route<'r>(router: &'r impl Router, port_id: &PortId) -> Result<&'r dyn Module, ContextError> {
    let module_id = router
        .lookup_module(port_id)
        .ok_or(RouterError::UnknownPort {
            port_id: port_id.clone(),
        })?;

    Ok(router
        .get_route(&module_id)
        .ok_or(RouterError::ModuleNotFound)?)
}

fn route_mut<'r>(
    router: &'r mut impl Router,
    port_id: &PortId,
) -> Result<&'r mut dyn Module, ContextError> {
    let module_id = router
        .lookup_module(port_id)
        .ok_or(RouterError::UnknownPort {
            port_id: port_id.clone(),
        })?;

    Ok(router
        .get_route_mut(&module_id)
        .ok_or(RouterError::ModuleNotFound)?)
}
