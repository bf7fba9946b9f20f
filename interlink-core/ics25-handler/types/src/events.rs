//! Defines events emitted during handling of channel layer messages

use interlink_core_channel_types::events::{self as ChannelEvents, EventAttribute};
use interlink_core_router_types::event::ModuleEvent;
use interlink_primitives::prelude::*;

const MESSAGE_EVENT: &str = "message";

/// Events created by the channel layer of a chain, destined for a relayer.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IbcEvent {
    OpenInitChannel(ChannelEvents::OpenInit),
    OpenTryChannel(ChannelEvents::OpenTry),
    OpenAckChannel(ChannelEvents::OpenAck),
    OpenConfirmChannel(ChannelEvents::OpenConfirm),
    CloseInitChannel(ChannelEvents::CloseInit),
    CloseConfirmChannel(ChannelEvents::CloseConfirm),

    SendPacket(ChannelEvents::SendPacket),
    ReceivePacket(ChannelEvents::ReceivePacket),
    WriteAcknowledgement(ChannelEvents::WriteAcknowledgement),
    AcknowledgePacket(ChannelEvents::AcknowledgePacket),
    TimeoutPacket(ChannelEvents::TimeoutPacket),
    ChannelClosed(ChannelEvents::ChannelClosed),

    UpgradeInitChannel(ChannelEvents::UpgradeInit),
    UpgradeTryChannel(ChannelEvents::UpgradeTry),
    UpgradeAckChannel(ChannelEvents::UpgradeAck),
    UpgradeConfirmChannel(ChannelEvents::UpgradeConfirm),
    UpgradeOpenChannel(ChannelEvents::UpgradeOpen),
    UpgradeTimeoutChannel(ChannelEvents::UpgradeTimeout),
    UpgradeCancelledChannel(ChannelEvents::UpgradeCancelled),
    UpgradeErrorChannel(ChannelEvents::UpgradeError),

    Module(ModuleEvent),
    Message(MessageEvent),
}

impl IbcEvent {
    pub fn event_type(&self) -> &str {
        match self {
            IbcEvent::OpenInitChannel(event) => event.event_type(),
            IbcEvent::OpenTryChannel(event) => event.event_type(),
            IbcEvent::OpenAckChannel(event) => event.event_type(),
            IbcEvent::OpenConfirmChannel(event) => event.event_type(),
            IbcEvent::CloseInitChannel(event) => event.event_type(),
            IbcEvent::CloseConfirmChannel(event) => event.event_type(),
            IbcEvent::SendPacket(event) => event.event_type(),
            IbcEvent::ReceivePacket(event) => event.event_type(),
            IbcEvent::WriteAcknowledgement(event) => event.event_type(),
            IbcEvent::AcknowledgePacket(event) => event.event_type(),
            IbcEvent::TimeoutPacket(event) => event.event_type(),
            IbcEvent::ChannelClosed(event) => event.event_type(),
            IbcEvent::UpgradeInitChannel(event) => event.event_type(),
            IbcEvent::UpgradeTryChannel(event) => event.event_type(),
            IbcEvent::UpgradeAckChannel(event) => event.event_type(),
            IbcEvent::UpgradeConfirmChannel(event) => event.event_type(),
            IbcEvent::UpgradeOpenChannel(event) => event.event_type(),
            IbcEvent::UpgradeTimeoutChannel(event) => event.event_type(),
            IbcEvent::UpgradeCancelledChannel(event) => event.event_type(),
            IbcEvent::UpgradeErrorChannel(event) => event.event_type(),
            IbcEvent::Module(module_event) => module_event.kind.as_str(),
            IbcEvent::Message(_) => MESSAGE_EVENT,
        }
    }

    /// Flattens the event into the key/value pairs a host indexes.
    pub fn attributes(&self) -> Vec<(String, String)> {
        let core: Vec<EventAttribute> = match self {
            IbcEvent::OpenInitChannel(event) => event.attributes(),
            IbcEvent::OpenTryChannel(event) => event.attributes(),
            IbcEvent::OpenAckChannel(event) => event.attributes(),
            IbcEvent::OpenConfirmChannel(event) => event.attributes(),
            IbcEvent::CloseInitChannel(event) => event.attributes(),
            IbcEvent::CloseConfirmChannel(event) => event.attributes(),
            IbcEvent::SendPacket(event) => event.attributes(),
            IbcEvent::ReceivePacket(event) => event.attributes(),
            IbcEvent::WriteAcknowledgement(event) => event.attributes(),
            IbcEvent::AcknowledgePacket(event) => event.attributes(),
            IbcEvent::TimeoutPacket(event) => event.attributes(),
            IbcEvent::ChannelClosed(event) => event.attributes(),
            IbcEvent::UpgradeInitChannel(event) => event.attributes(),
            IbcEvent::UpgradeTryChannel(event) => event.attributes(),
            IbcEvent::UpgradeAckChannel(event) => event.attributes(),
            IbcEvent::UpgradeConfirmChannel(event) => event.attributes(),
            IbcEvent::UpgradeOpenChannel(event) => event.attributes(),
            IbcEvent::UpgradeTimeoutChannel(event) => event.attributes(),
            IbcEvent::UpgradeCancelledChannel(event) => event.attributes(),
            IbcEvent::UpgradeErrorChannel(event) => event.attributes(),
            IbcEvent::Module(module_event) => {
                return module_event
                    .attributes
                    .iter()
                    .map(|attr| (attr.key.clone(), attr.value.clone()))
                    .collect()
            }
            IbcEvent::Message(event) => vec![("module", event.module_attribute())],
        };

        core.into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

/// An event that tags which component handled a message, emitted ahead of
/// the component's own event.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageEvent {
    Channel,
    // stores the module name
    Module(String),
}

impl MessageEvent {
    /// The message event has only one attribute, with key `module`.
    /// This method gets the associated value.
    pub fn module_attribute(&self) -> String {
        match self {
            MessageEvent::Channel => "ibc_channel".to_string(),
            MessageEvent::Module(module_name) => module_name.clone(),
        }
    }
}

impl From<MessageEvent> for IbcEvent {
    fn from(e: MessageEvent) -> Self {
        IbcEvent::Message(e)
    }
}

impl From<ModuleEvent> for IbcEvent {
    fn from(e: ModuleEvent) -> Self {
        IbcEvent::Module(e)
    }
}
