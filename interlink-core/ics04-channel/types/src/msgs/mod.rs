//! Message definitions for the channel layer: channel open & close handshake
//! datagrams, packets, and the channel upgrade handshake.

mod acknowledgement;
mod chan_close_confirm;
mod chan_close_init;
mod chan_open_ack;
mod chan_open_confirm;
mod chan_open_init;
mod chan_open_try;
mod chan_upgrade_ack;
mod chan_upgrade_cancel;
mod chan_upgrade_confirm;
mod chan_upgrade_init;
mod chan_upgrade_open;
mod chan_upgrade_timeout;
mod chan_upgrade_try;
mod recv_packet;
mod timeout;
mod timeout_on_close;

// Packet specific messages.
pub use acknowledgement::*;
// Closing handshake messages.
pub use chan_close_confirm::*;
pub use chan_close_init::*;
// Opening handshake messages.
pub use chan_open_ack::*;
pub use chan_open_confirm::*;
pub use chan_open_init::*;
pub use chan_open_try::*;
// Upgrade handshake messages.
pub use chan_upgrade_ack::*;
pub use chan_upgrade_cancel::*;
pub use chan_upgrade_confirm::*;
pub use chan_upgrade_init::*;
pub use chan_upgrade_open::*;
pub use chan_upgrade_timeout::*;
pub use chan_upgrade_try::*;
use interlink_core_host_types::identifiers::*;
pub use recv_packet::*;
pub use timeout::*;
pub use timeout_on_close::*;

/// All channel messages
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, derive_more::From)]
pub enum ChannelMsg {
    OpenInit(MsgChannelOpenInit),
    OpenTry(MsgChannelOpenTry),
    OpenAck(MsgChannelOpenAck),
    OpenConfirm(MsgChannelOpenConfirm),
    CloseInit(MsgChannelCloseInit),
    CloseConfirm(MsgChannelCloseConfirm),
}

/// All packet messages
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, derive_more::From)]
pub enum PacketMsg {
    Recv(MsgRecvPacket),
    Ack(MsgAcknowledgement),
    Timeout(MsgTimeout),
    TimeoutOnClose(MsgTimeoutOnClose),
}

/// All channel upgrade messages
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, derive_more::From)]
pub enum UpgradeMsg {
    Init(MsgChannelUpgradeInit),
    Try(MsgChannelUpgradeTry),
    Ack(MsgChannelUpgradeAck),
    Confirm(MsgChannelUpgradeConfirm),
    Open(MsgChannelUpgradeOpen),
    Cancel(MsgChannelUpgradeCancel),
    Timeout(MsgChannelUpgradeTimeout),
}

pub fn channel_msg_to_port_id(msg: &ChannelMsg) -> &PortId {
    match msg {
        ChannelMsg::OpenInit(msg) => &msg.port_id_on_a,
        ChannelMsg::OpenTry(msg) => &msg.port_id_on_b,
        ChannelMsg::OpenAck(msg) => &msg.port_id_on_a,
        ChannelMsg::OpenConfirm(msg) => &msg.port_id_on_b,
        ChannelMsg::CloseInit(msg) => &msg.port_id_on_a,
        ChannelMsg::CloseConfirm(msg) => &msg.port_id_on_b,
    }
}

pub fn packet_msg_to_port_id(msg: &PacketMsg) -> &PortId {
    match msg {
        PacketMsg::Recv(msg) => &msg.packet.port_id_on_b,
        PacketMsg::Ack(msg) => &msg.packet.port_id_on_a,
        PacketMsg::Timeout(msg) => &msg.packet.port_id_on_a,
        PacketMsg::TimeoutOnClose(msg) => &msg.packet.port_id_on_a,
    }
}

pub fn upgrade_msg_to_port_id(msg: &UpgradeMsg) -> &PortId {
    match msg {
        UpgradeMsg::Init(msg) => &msg.port_id_on_a,
        UpgradeMsg::Try(msg) => &msg.port_id_on_b,
        UpgradeMsg::Ack(msg) => &msg.port_id_on_a,
        UpgradeMsg::Confirm(msg) => &msg.port_id_on_b,
        UpgradeMsg::Open(msg) => &msg.port_id,
        UpgradeMsg::Cancel(msg) => &msg.port_id,
        UpgradeMsg::Timeout(msg) => &msg.port_id,
    }
}
