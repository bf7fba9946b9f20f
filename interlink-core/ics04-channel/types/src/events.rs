//! Events emitted by the channel handlers.
//!
//! Each event exposes an `event_type` and a flat list of key/value
//! attributes, which is the shape hosts forward to indexers.

use interlink_core_host_types::identifiers::{ChannelId, ConnectionId, PortId};
use interlink_primitives::prelude::*;

use super::acknowledgement::Acknowledgement;
use super::channel::{ChannelEnd, Order, State};
use super::packet::Packet;
use super::upgrade::{ErrorReceipt, UpgradeFields};
use super::Version;

const CHANNEL_OPEN_INIT_EVENT: &str = "channel_open_init";
const CHANNEL_OPEN_TRY_EVENT: &str = "channel_open_try";
const CHANNEL_OPEN_ACK_EVENT: &str = "channel_open_ack";
const CHANNEL_OPEN_CONFIRM_EVENT: &str = "channel_open_confirm";
const CHANNEL_CLOSE_INIT_EVENT: &str = "channel_close_init";
const CHANNEL_CLOSE_CONFIRM_EVENT: &str = "channel_close_confirm";
const CHANNEL_CLOSED_EVENT: &str = "channel_close";

const SEND_PACKET_EVENT: &str = "send_packet";
const RECEIVE_PACKET_EVENT: &str = "recv_packet";
const WRITE_ACK_EVENT: &str = "write_acknowledgement";
const ACK_PACKET_EVENT: &str = "acknowledge_packet";
const TIMEOUT_EVENT: &str = "timeout_packet";

const CHANNEL_UPGRADE_INIT_EVENT: &str = "channel_upgrade_init";
const CHANNEL_UPGRADE_TRY_EVENT: &str = "channel_upgrade_try";
const CHANNEL_UPGRADE_ACK_EVENT: &str = "channel_upgrade_ack";
const CHANNEL_UPGRADE_CONFIRM_EVENT: &str = "channel_upgrade_confirm";
const CHANNEL_UPGRADE_OPEN_EVENT: &str = "channel_upgrade_open";
const CHANNEL_UPGRADE_TIMEOUT_EVENT: &str = "channel_upgrade_timeout";
const CHANNEL_UPGRADE_CANCELLED_EVENT: &str = "channel_upgrade_cancelled";
const CHANNEL_UPGRADE_ERROR_EVENT: &str = "channel_upgrade_error";

const PORT_ID_ATTRIBUTE_KEY: &str = "port_id";
const CHANNEL_ID_ATTRIBUTE_KEY: &str = "channel_id";
const COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY: &str = "counterparty_port_id";
const COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY: &str = "counterparty_channel_id";
const CONNECTION_ID_ATTRIBUTE_KEY: &str = "connection_id";
const VERSION_ATTRIBUTE_KEY: &str = "version";

const PKT_DATA_HEX_ATTRIBUTE_KEY: &str = "packet_data_hex";
const PKT_TIMEOUT_HEIGHT_ATTRIBUTE_KEY: &str = "packet_timeout_height";
const PKT_TIMEOUT_TIMESTAMP_ATTRIBUTE_KEY: &str = "packet_timeout_timestamp";
const PKT_SEQ_ATTRIBUTE_KEY: &str = "packet_sequence";
const PKT_SRC_PORT_ATTRIBUTE_KEY: &str = "packet_src_port";
const PKT_SRC_CHANNEL_ATTRIBUTE_KEY: &str = "packet_src_channel";
const PKT_DST_PORT_ATTRIBUTE_KEY: &str = "packet_dst_port";
const PKT_DST_CHANNEL_ATTRIBUTE_KEY: &str = "packet_dst_channel";
const PKT_CHANNEL_ORDERING_ATTRIBUTE_KEY: &str = "packet_channel_ordering";
const PKT_CONNECTION_ID_ATTRIBUTE_KEY: &str = "packet_connection";
const PKT_ACK_HEX_ATTRIBUTE_KEY: &str = "packet_ack_hex";

const UPGRADE_SEQUENCE_ATTRIBUTE_KEY: &str = "upgrade_sequence";
const UPGRADE_ORDERING_ATTRIBUTE_KEY: &str = "upgrade_ordering";
const UPGRADE_CONNECTION_HOPS_ATTRIBUTE_KEY: &str = "upgrade_connection_hops";
const UPGRADE_VERSION_ATTRIBUTE_KEY: &str = "upgrade_version";
const CHANNEL_STATE_ATTRIBUTE_KEY: &str = "channel_state";
const ERROR_RECEIPT_ATTRIBUTE_KEY: &str = "error_receipt";

/// A single key/value pair of an event.
pub type EventAttribute = (&'static str, String);

fn hex_upper(bytes: &[u8]) -> String {
    String::from_utf8(subtle_encoding::hex::encode_upper(bytes)).unwrap_or_default()
}

fn channel_id_or_empty(channel_id: &Option<ChannelId>) -> String {
    channel_id
        .as_ref()
        .map_or_else(String::new, ToString::to_string)
}

fn packet_attributes(packet: &Packet) -> Vec<EventAttribute> {
    vec![
        (PKT_DATA_HEX_ATTRIBUTE_KEY, hex_upper(&packet.data)),
        (
            PKT_TIMEOUT_HEIGHT_ATTRIBUTE_KEY,
            packet.timeout_height_on_b.to_string(),
        ),
        (
            PKT_TIMEOUT_TIMESTAMP_ATTRIBUTE_KEY,
            packet.timeout_timestamp_on_b.nanoseconds().to_string(),
        ),
        (PKT_SEQ_ATTRIBUTE_KEY, packet.seq_on_a.to_string()),
        (PKT_SRC_PORT_ATTRIBUTE_KEY, packet.port_id_on_a.to_string()),
        (PKT_SRC_CHANNEL_ATTRIBUTE_KEY, packet.chan_id_on_a.to_string()),
        (PKT_DST_PORT_ATTRIBUTE_KEY, packet.port_id_on_b.to_string()),
        (PKT_DST_CHANNEL_ATTRIBUTE_KEY, packet.chan_id_on_b.to_string()),
    ]
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenInit {
    pub port_id_on_a: PortId,
    pub chan_id_on_a: ChannelId,
    pub port_id_on_b: PortId,
    pub conn_id_on_a: ConnectionId,
    pub version_on_a: Version,
}

impl OpenInit {
    pub fn event_type(&self) -> &str {
        CHANNEL_OPEN_INIT_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        vec![
            (PORT_ID_ATTRIBUTE_KEY, self.port_id_on_a.to_string()),
            (CHANNEL_ID_ATTRIBUTE_KEY, self.chan_id_on_a.to_string()),
            (COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY, self.port_id_on_b.to_string()),
            (COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY, String::new()),
            (CONNECTION_ID_ATTRIBUTE_KEY, self.conn_id_on_a.to_string()),
            (VERSION_ATTRIBUTE_KEY, self.version_on_a.to_string()),
        ]
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenTry {
    pub port_id_on_b: PortId,
    pub chan_id_on_b: ChannelId,
    pub port_id_on_a: PortId,
    pub chan_id_on_a: ChannelId,
    pub conn_id_on_b: ConnectionId,
    pub version_on_b: Version,
}

impl OpenTry {
    pub fn event_type(&self) -> &str {
        CHANNEL_OPEN_TRY_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        vec![
            (PORT_ID_ATTRIBUTE_KEY, self.port_id_on_b.to_string()),
            (CHANNEL_ID_ATTRIBUTE_KEY, self.chan_id_on_b.to_string()),
            (COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY, self.port_id_on_a.to_string()),
            (COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY, self.chan_id_on_a.to_string()),
            (CONNECTION_ID_ATTRIBUTE_KEY, self.conn_id_on_b.to_string()),
            (VERSION_ATTRIBUTE_KEY, self.version_on_b.to_string()),
        ]
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenAck {
    pub port_id_on_a: PortId,
    pub chan_id_on_a: ChannelId,
    pub port_id_on_b: PortId,
    pub chan_id_on_b: ChannelId,
    pub conn_id_on_a: ConnectionId,
}

impl OpenAck {
    pub fn event_type(&self) -> &str {
        CHANNEL_OPEN_ACK_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        vec![
            (PORT_ID_ATTRIBUTE_KEY, self.port_id_on_a.to_string()),
            (CHANNEL_ID_ATTRIBUTE_KEY, self.chan_id_on_a.to_string()),
            (COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY, self.port_id_on_b.to_string()),
            (COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY, self.chan_id_on_b.to_string()),
            (CONNECTION_ID_ATTRIBUTE_KEY, self.conn_id_on_a.to_string()),
        ]
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenConfirm {
    pub port_id_on_b: PortId,
    pub chan_id_on_b: ChannelId,
    pub port_id_on_a: PortId,
    pub chan_id_on_a: ChannelId,
    pub conn_id_on_b: ConnectionId,
}

impl OpenConfirm {
    pub fn event_type(&self) -> &str {
        CHANNEL_OPEN_CONFIRM_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        vec![
            (PORT_ID_ATTRIBUTE_KEY, self.port_id_on_b.to_string()),
            (CHANNEL_ID_ATTRIBUTE_KEY, self.chan_id_on_b.to_string()),
            (COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY, self.port_id_on_a.to_string()),
            (COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY, self.chan_id_on_a.to_string()),
            (CONNECTION_ID_ATTRIBUTE_KEY, self.conn_id_on_b.to_string()),
        ]
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloseInit {
    pub port_id_on_a: PortId,
    pub chan_id_on_a: ChannelId,
    pub port_id_on_b: PortId,
    pub chan_id_on_b: Option<ChannelId>,
    pub conn_id_on_a: ConnectionId,
}

impl CloseInit {
    pub fn event_type(&self) -> &str {
        CHANNEL_CLOSE_INIT_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        vec![
            (PORT_ID_ATTRIBUTE_KEY, self.port_id_on_a.to_string()),
            (CHANNEL_ID_ATTRIBUTE_KEY, self.chan_id_on_a.to_string()),
            (COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY, self.port_id_on_b.to_string()),
            (
                COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY,
                channel_id_or_empty(&self.chan_id_on_b),
            ),
            (CONNECTION_ID_ATTRIBUTE_KEY, self.conn_id_on_a.to_string()),
        ]
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloseConfirm {
    pub port_id_on_b: PortId,
    pub chan_id_on_b: ChannelId,
    pub port_id_on_a: PortId,
    pub chan_id_on_a: Option<ChannelId>,
    pub conn_id_on_b: ConnectionId,
}

impl CloseConfirm {
    pub fn event_type(&self) -> &str {
        CHANNEL_CLOSE_CONFIRM_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        vec![
            (PORT_ID_ATTRIBUTE_KEY, self.port_id_on_b.to_string()),
            (CHANNEL_ID_ATTRIBUTE_KEY, self.chan_id_on_b.to_string()),
            (COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY, self.port_id_on_a.to_string()),
            (
                COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY,
                channel_id_or_empty(&self.chan_id_on_a),
            ),
            (CONNECTION_ID_ATTRIBUTE_KEY, self.conn_id_on_b.to_string()),
        ]
    }
}

/// Emitted when an ordered channel is closed because one of its packets
/// timed out.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelClosed {
    pub port_id_on_a: PortId,
    pub chan_id_on_a: ChannelId,
    pub port_id_on_b: PortId,
    pub chan_id_on_b: Option<ChannelId>,
    pub conn_id_on_a: ConnectionId,
    pub channel_ordering: Order,
}

impl ChannelClosed {
    pub fn event_type(&self) -> &str {
        CHANNEL_CLOSED_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        vec![
            (PORT_ID_ATTRIBUTE_KEY, self.port_id_on_a.to_string()),
            (CHANNEL_ID_ATTRIBUTE_KEY, self.chan_id_on_a.to_string()),
            (COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY, self.port_id_on_b.to_string()),
            (
                COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY,
                channel_id_or_empty(&self.chan_id_on_b),
            ),
            (CONNECTION_ID_ATTRIBUTE_KEY, self.conn_id_on_a.to_string()),
            (
                PKT_CHANNEL_ORDERING_ATTRIBUTE_KEY,
                self.channel_ordering.to_string(),
            ),
        ]
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendPacket {
    pub packet: Packet,
    pub channel_ordering: Order,
    pub src_connection_id: ConnectionId,
}

impl SendPacket {
    pub fn event_type(&self) -> &str {
        SEND_PACKET_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        let mut attributes = packet_attributes(&self.packet);
        attributes.push((
            PKT_CHANNEL_ORDERING_ATTRIBUTE_KEY,
            self.channel_ordering.to_string(),
        ));
        attributes.push((
            PKT_CONNECTION_ID_ATTRIBUTE_KEY,
            self.src_connection_id.to_string(),
        ));
        attributes
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivePacket {
    pub packet: Packet,
    pub channel_ordering: Order,
    pub dst_connection_id: ConnectionId,
}

impl ReceivePacket {
    pub fn event_type(&self) -> &str {
        RECEIVE_PACKET_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        let mut attributes = packet_attributes(&self.packet);
        attributes.push((
            PKT_CHANNEL_ORDERING_ATTRIBUTE_KEY,
            self.channel_ordering.to_string(),
        ));
        attributes.push((
            PKT_CONNECTION_ID_ATTRIBUTE_KEY,
            self.dst_connection_id.to_string(),
        ));
        attributes
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteAcknowledgement {
    pub packet: Packet,
    pub acknowledgement: Acknowledgement,
    pub dst_connection_id: ConnectionId,
}

impl WriteAcknowledgement {
    pub fn event_type(&self) -> &str {
        WRITE_ACK_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        let mut attributes = packet_attributes(&self.packet);
        attributes.push((
            PKT_ACK_HEX_ATTRIBUTE_KEY,
            hex_upper(self.acknowledgement.as_bytes()),
        ));
        attributes.push((
            PKT_CONNECTION_ID_ATTRIBUTE_KEY,
            self.dst_connection_id.to_string(),
        ));
        attributes
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcknowledgePacket {
    pub packet: Packet,
    pub channel_ordering: Order,
    pub src_connection_id: ConnectionId,
}

impl AcknowledgePacket {
    pub fn event_type(&self) -> &str {
        ACK_PACKET_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        let mut attributes = packet_attributes(&self.packet);
        attributes.push((
            PKT_CHANNEL_ORDERING_ATTRIBUTE_KEY,
            self.channel_ordering.to_string(),
        ));
        attributes.push((
            PKT_CONNECTION_ID_ATTRIBUTE_KEY,
            self.src_connection_id.to_string(),
        ));
        attributes
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeoutPacket {
    pub packet: Packet,
    pub channel_ordering: Order,
}

impl TimeoutPacket {
    pub fn event_type(&self) -> &str {
        TIMEOUT_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        let mut attributes = packet_attributes(&self.packet);
        attributes.push((
            PKT_CHANNEL_ORDERING_ATTRIBUTE_KEY,
            self.channel_ordering.to_string(),
        ));
        attributes
    }
}

/// The attributes shared by every upgrade step.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpgradeAttributes {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub counterparty_port_id: PortId,
    pub counterparty_channel_id: Option<ChannelId>,
    pub upgrade_sequence: u64,
}

impl UpgradeAttributes {
    /// Attributes of the channel end `(port_id, channel_id)` as it stands.
    pub fn new(port_id: &PortId, channel_id: &ChannelId, channel_end: &ChannelEnd) -> Self {
        Self {
            port_id: port_id.clone(),
            channel_id: channel_id.clone(),
            counterparty_port_id: channel_end.counterparty().port_id().clone(),
            counterparty_channel_id: channel_end.counterparty().channel_id().cloned(),
            upgrade_sequence: channel_end.upgrade_sequence(),
        }
    }

    fn to_attributes(&self) -> Vec<EventAttribute> {
        vec![
            (PORT_ID_ATTRIBUTE_KEY, self.port_id.to_string()),
            (CHANNEL_ID_ATTRIBUTE_KEY, self.channel_id.to_string()),
            (
                COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY,
                self.counterparty_port_id.to_string(),
            ),
            (
                COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY,
                channel_id_or_empty(&self.counterparty_channel_id),
            ),
            (
                UPGRADE_SEQUENCE_ATTRIBUTE_KEY,
                self.upgrade_sequence.to_string(),
            ),
        ]
    }
}

fn upgrade_fields_attributes(fields: &UpgradeFields) -> Vec<EventAttribute> {
    vec![
        (UPGRADE_ORDERING_ATTRIBUTE_KEY, fields.ordering.to_string()),
        (
            UPGRADE_CONNECTION_HOPS_ATTRIBUTE_KEY,
            fields
                .connection_hops
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        (UPGRADE_VERSION_ATTRIBUTE_KEY, fields.version.to_string()),
    ]
}

/// Declares an upgrade step event carrying the proposed upgrade fields.
macro_rules! upgrade_step_event {
    ($(#[$meta:meta])* $name:ident, $event_type:expr) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            pub attributes: UpgradeAttributes,
            pub upgrade_fields: UpgradeFields,
        }

        impl $name {
            pub fn event_type(&self) -> &str {
                $event_type
            }

            pub fn attributes(&self) -> Vec<EventAttribute> {
                let mut attributes = self.attributes.to_attributes();
                attributes.extend(upgrade_fields_attributes(&self.upgrade_fields));
                attributes
            }
        }
    };
}

upgrade_step_event!(UpgradeInit, CHANNEL_UPGRADE_INIT_EVENT);
upgrade_step_event!(UpgradeTry, CHANNEL_UPGRADE_TRY_EVENT);
upgrade_step_event!(UpgradeAck, CHANNEL_UPGRADE_ACK_EVENT);
upgrade_step_event!(
    /// Emitted by the end that confirms the counterparty moved to flushing.
    UpgradeConfirm,
    CHANNEL_UPGRADE_CONFIRM_EVENT
);
upgrade_step_event!(
    /// Emitted once the upgraded fields are committed onto the channel.
    UpgradeOpen,
    CHANNEL_UPGRADE_OPEN_EVENT
);

/// Emitted when an upgrade is abandoned because it timed out.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpgradeTimeout {
    pub attributes: UpgradeAttributes,
}

impl UpgradeTimeout {
    pub fn event_type(&self) -> &str {
        CHANNEL_UPGRADE_TIMEOUT_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        self.attributes.to_attributes()
    }
}

/// Emitted when an upgrade is cancelled after the counterparty proved its
/// own abort.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpgradeCancelled {
    pub attributes: UpgradeAttributes,
}

impl UpgradeCancelled {
    pub fn event_type(&self) -> &str {
        CHANNEL_UPGRADE_CANCELLED_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        self.attributes.to_attributes()
    }
}

/// Emitted whenever an upgrade attempt is aborted and an error receipt is
/// written.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpgradeError {
    pub attributes: UpgradeAttributes,
    pub channel_state: State,
    pub error_receipt: ErrorReceipt,
}

impl UpgradeError {
    pub fn event_type(&self) -> &str {
        CHANNEL_UPGRADE_ERROR_EVENT
    }

    pub fn attributes(&self) -> Vec<EventAttribute> {
        let mut attributes = self.attributes.to_attributes();
        attributes.push((CHANNEL_STATE_ATTRIBUTE_KEY, self.channel_state.to_string()));
        attributes.push((
            ERROR_RECEIPT_ATTRIBUTE_KEY,
            self.error_receipt.message.clone(),
        ));
        attributes
    }
}
