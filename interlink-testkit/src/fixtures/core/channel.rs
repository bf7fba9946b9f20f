//! Dummy connection ends, channel ends and packets.

use interlink_core::channel::types::channel::{ChannelEnd, Counterparty, Order, State};
use interlink_core::channel::types::packet::Packet;
use interlink_core::channel::types::timeout::{TimeoutHeight, TimeoutTimestamp};
use interlink_core::channel::types::upgrade::{UpgradeFields, UpgradeTimeout};
use interlink_core::channel::types::Version;
use interlink_core::client_types::Height;
use interlink_core::commitment_types::commitment::CommitmentPrefix;
use interlink_core::connection_types::{
    ConnectionEnd, Counterparty as ConnectionCounterparty, State as ConnectionState,
};
use interlink_core::host::types::identifiers::{ChannelId, ClientId, ConnectionId, PortId, Sequence};
use interlink_core::primitives::prelude::*;
use typed_builder::TypedBuilder;

use crate::testapp::applications::dummy::{DUMMY_PORT_ID, DUMMY_VERSION};

pub fn dummy_port_id() -> PortId {
    PortId::new(DUMMY_PORT_ID.to_string()).expect("Never fails")
}

pub fn dummy_client_id() -> ClientId {
    ClientId::new("07-mock", 0).expect("Never fails")
}

pub fn dummy_version() -> Version {
    Version::new(DUMMY_VERSION.to_string())
}

/// Configuration of a [`ConnectionEnd`] between two mock chains.
#[derive(Debug, TypedBuilder)]
#[builder(build_method(into = ConnectionEnd))]
pub struct ConnectionConfig {
    #[builder(default = ConnectionState::Open)]
    state: ConnectionState,

    #[builder(default = dummy_client_id())]
    client_id: ClientId,

    #[builder(default = dummy_client_id())]
    counterparty_client_id: ClientId,

    #[builder(default = Some(ConnectionId::zero()))]
    counterparty_connection_id: Option<ConnectionId>,

    #[builder(default = CommitmentPrefix::try_from(b"mock".to_vec()).expect("Never fails"))]
    counterparty_prefix: CommitmentPrefix,
}

impl From<ConnectionConfig> for ConnectionEnd {
    fn from(config: ConnectionConfig) -> Self {
        ConnectionEnd::new(
            config.state,
            config.client_id,
            ConnectionCounterparty::new(
                config.counterparty_client_id,
                config.counterparty_connection_id,
                config.counterparty_prefix,
            ),
        )
    }
}

/// Configuration of a [`ChannelEnd`], open and unordered on the dummy port
/// unless told otherwise.
#[derive(Debug, TypedBuilder)]
#[builder(build_method(into = ChannelEnd))]
pub struct ChannelConfig {
    #[builder(default = State::Open)]
    state: State,

    #[builder(default = Order::Unordered)]
    ordering: Order,

    #[builder(default = dummy_port_id())]
    counterparty_port_id: PortId,

    #[builder(default = Some(ChannelId::zero()))]
    counterparty_channel_id: Option<ChannelId>,

    #[builder(default = vec![ConnectionId::zero()])]
    connection_hops: Vec<ConnectionId>,

    #[builder(default = dummy_version())]
    version: Version,

    #[builder(default = 0)]
    upgrade_sequence: u64,
}

impl From<ChannelConfig> for ChannelEnd {
    fn from(config: ChannelConfig) -> Self {
        ChannelEnd::new(
            config.state,
            config.ordering,
            Counterparty::new(config.counterparty_port_id, config.counterparty_channel_id),
            config.connection_hops,
            config.version,
            config.upgrade_sequence,
        )
        .expect("valid channel end")
    }
}

/// A packet from `channel-0` to `channel-0` on the dummy port, timing out at
/// revision height 100.
pub fn dummy_packet(seq_on_a: u64) -> Packet {
    Packet {
        seq_on_a: Sequence::from(seq_on_a),
        port_id_on_a: dummy_port_id(),
        chan_id_on_a: ChannelId::zero(),
        port_id_on_b: dummy_port_id(),
        chan_id_on_b: ChannelId::zero(),
        data: b"ping".to_vec(),
        timeout_height_on_b: TimeoutHeight::At(Height::new(0, 100).expect("Never fails")),
        timeout_timestamp_on_b: TimeoutTimestamp::Never,
    }
}

/// Upgrade fields moving a channel to `version` on `connection-0`.
pub fn dummy_upgrade_fields(ordering: Order, version: &str) -> UpgradeFields {
    UpgradeFields::new(
        ordering,
        vec![ConnectionId::zero()],
        Version::new(version.to_string()),
    )
}

/// An upgrade timeout far ahead of any mock chain.
pub fn dummy_upgrade_timeout() -> UpgradeTimeout {
    UpgradeTimeout::at_height(Height::new(0, 1_000).expect("Never fails"))
}
