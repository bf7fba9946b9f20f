use interlink_core_channel_types::msgs::{ChannelMsg, PacketMsg, UpgradeMsg};
use interlink_primitives::Signer;

/// Enumeration of all messages that the channel layer is capable of routing.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, derive_more::From)]
pub enum MsgEnvelope {
    Channel(ChannelMsg),
    Packet(PacketMsg),
    Upgrade(UpgradeMsg),
}

impl MsgEnvelope {
    pub fn signer(&self) -> &Signer {
        match self {
            MsgEnvelope::Channel(msg) => match msg {
                ChannelMsg::OpenInit(msg) => &msg.signer,
                ChannelMsg::OpenTry(msg) => &msg.signer,
                ChannelMsg::OpenAck(msg) => &msg.signer,
                ChannelMsg::OpenConfirm(msg) => &msg.signer,
                ChannelMsg::CloseInit(msg) => &msg.signer,
                ChannelMsg::CloseConfirm(msg) => &msg.signer,
            },
            MsgEnvelope::Packet(msg) => match msg {
                PacketMsg::Recv(msg) => &msg.signer,
                PacketMsg::Ack(msg) => &msg.signer,
                PacketMsg::Timeout(msg) => &msg.signer,
                PacketMsg::TimeoutOnClose(msg) => &msg.signer,
            },
            MsgEnvelope::Upgrade(msg) => match msg {
                UpgradeMsg::Init(msg) => &msg.signer,
                UpgradeMsg::Try(msg) => &msg.signer,
                UpgradeMsg::Ack(msg) => &msg.signer,
                UpgradeMsg::Confirm(msg) => &msg.signer,
                UpgradeMsg::Open(msg) => &msg.signer,
                UpgradeMsg::Cancel(msg) => &msg.signer,
                UpgradeMsg::Timeout(msg) => &msg.signer,
            },
        }
    }
}
