//! A host of remotely controlled accounts.
//!
//! Each owner on the counterparty chain gets one ORDERED channel per
//! connection, and the owner's address travels in the channel version as
//! `acct-1:<owner>`. The host never opens channels itself. Once the
//! channel of an owner is closed (an ORDERED channel closes on the first
//! packet timeout), the owner may open a new one and keeps its account, as
//! long as the owner in the new version is the same.

use alloc::collections::BTreeMap;

use interlink_core::channel::types::acknowledgement::Acknowledgement;
use interlink_core::channel::types::channel::{Counterparty, IdentifiedChannelEnd, Order};
use interlink_core::channel::types::error::{ChannelError, PacketError};
use interlink_core::channel::types::packet::Packet;
use interlink_core::channel::types::Version;
use interlink_core::host::types::identifiers::{ChannelId, ConnectionId, PortId};
use interlink_core::primitives::prelude::*;
use interlink_core::primitives::Signer;
use interlink_core::router::module::Module;
use interlink_core::router::types::event::ModuleEvent;
use interlink_core::router::types::module::ModuleExtras;

use super::dummy::dummy_success_ack;

pub const ACCOUNT_HOST_MODULE_ID: &str = "icahost";
pub const ACCOUNT_HOST_PORT_ID: &str = "icahost";
pub const ACCOUNT_VERSION_PREFIX: &str = "acct-1:";

/// Builds the channel version carrying `owner`.
pub fn account_version(owner: &str) -> Version {
    Version::new(format!("{ACCOUNT_VERSION_PREFIX}{owner}"))
}

/// Extracts the owner address from an account channel version.
pub fn parse_owner(version: &Version) -> Result<&str, ChannelError> {
    match version.as_str().strip_prefix(ACCOUNT_VERSION_PREFIX) {
        Some(owner) if !owner.is_empty() => Ok(owner),
        _ => Err(ChannelError::AppModule {
            description: format!("invalid account version: {version}"),
        }),
    }
}

#[derive(Clone, Debug, Default)]
pub struct AccountHostModule {
    /// The channel bound to each (connection, controller port) pair.
    active_channels: BTreeMap<(ConnectionId, PortId), ChannelId>,
}

impl AccountHostModule {
    fn check_ordering(order: Order) -> Result<(), ChannelError> {
        if order != Order::Ordered {
            return Err(ChannelError::InvalidOrderType {
                expected: Order::Ordered.to_string(),
                actual: order.to_string(),
            });
        }
        Ok(())
    }

    fn check_open_try(
        order: Order,
        connection_hops: &[ConnectionId],
        counterparty_version: &Version,
    ) -> Result<(), ChannelError> {
        Self::check_ordering(order)?;

        if connection_hops.len() != 1 {
            return Err(ChannelError::InvalidConnectionHopsLength {
                expected: 1,
                actual: connection_hops.len() as u64,
            });
        }

        parse_owner(counterparty_version)?;

        Ok(())
    }
}

impl Module for AccountHostModule {
    fn on_chan_open_init_validate(
        &self,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        _version: &Version,
    ) -> Result<Version, ChannelError> {
        Err(ChannelError::AppModule {
            description: "account channels are opened by the controller chain".to_string(),
        })
    }

    fn on_chan_open_init_execute(
        &mut self,
        order: Order,
        connection_hops: &[ConnectionId],
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty: &Counterparty,
        version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        self.on_chan_open_init_validate(
            order,
            connection_hops,
            port_id,
            channel_id,
            counterparty,
            version,
        )
        .map(|version| (ModuleExtras::empty(), version))
    }

    fn on_chan_open_try_validate(
        &self,
        order: Order,
        connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<Version, ChannelError> {
        Self::check_open_try(order, connection_hops, counterparty_version)?;

        Ok(counterparty_version.clone())
    }

    fn on_chan_open_try_execute(
        &mut self,
        order: Order,
        connection_hops: &[ConnectionId],
        _port_id: &PortId,
        channel_id: &ChannelId,
        counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        Self::check_open_try(order, connection_hops, counterparty_version)?;

        let owner = parse_owner(counterparty_version)?;

        self.active_channels.insert(
            (connection_hops[0].clone(), counterparty.port_id().clone()),
            channel_id.clone(),
        );

        let extras = ModuleExtras::empty()
            .with_event(
                ModuleEvent::new("account_channel_bound")
                    .with_attribute(("owner", owner))
                    .with_attribute(("channel", channel_id.clone())),
            )
            .with_log(format!("account host: {owner} bound to {channel_id}"));

        Ok((extras, counterparty_version.clone()))
    }

    fn active_channel(
        &self,
        connection_id: &ConnectionId,
        counterparty_port_id: &PortId,
    ) -> Option<ChannelId> {
        self.active_channels
            .get(&(connection_id.clone(), counterparty_port_id.clone()))
            .cloned()
    }

    fn on_chan_open_try_reopen(
        &self,
        closed_channel: &IdentifiedChannelEnd,
        counterparty_version: &Version,
    ) -> Result<(), ChannelError> {
        let previous_owner = parse_owner(closed_channel.channel_end.version())?;
        let requested_owner = parse_owner(counterparty_version)?;

        if previous_owner != requested_owner {
            return Err(ChannelError::AppModule {
                description: format!(
                    "invalid account address: expected {previous_owner}, got {requested_owner}"
                ),
            });
        }

        Ok(())
    }

    fn on_recv_packet_execute(
        &mut self,
        _packet: &Packet,
        _relayer: &Signer,
    ) -> (ModuleExtras, Acknowledgement) {
        (ModuleExtras::empty(), dummy_success_ack())
    }

    fn on_acknowledgement_packet_validate(
        &self,
        _packet: &Packet,
        _acknowledgement: &Acknowledgement,
        _relayer: &Signer,
    ) -> Result<(), PacketError> {
        Ok(())
    }

    fn on_acknowledgement_packet_execute(
        &mut self,
        _packet: &Packet,
        _acknowledgement: &Acknowledgement,
        _relayer: &Signer,
    ) -> (ModuleExtras, Result<(), PacketError>) {
        (ModuleExtras::empty(), Ok(()))
    }

    fn on_timeout_packet_validate(
        &self,
        _packet: &Packet,
        _relayer: &Signer,
    ) -> Result<(), PacketError> {
        Ok(())
    }

    fn on_timeout_packet_execute(
        &mut self,
        _packet: &Packet,
        _relayer: &Signer,
    ) -> (ModuleExtras, Result<(), PacketError>) {
        (ModuleExtras::empty(), Ok(()))
    }

    fn on_chan_upgrade_init_validate(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        ordering: Order,
        _connection_hops: &[ConnectionId],
        version: &Version,
    ) -> Result<Version, ChannelError> {
        Self::check_ordering(ordering)?;
        parse_owner(version)?;
        Ok(version.clone())
    }

    fn on_chan_upgrade_init_execute(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        ordering: Order,
        connection_hops: &[ConnectionId],
        version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        self.on_chan_upgrade_init_validate(port_id, channel_id, ordering, connection_hops, version)
            .map(|version| (ModuleExtras::empty(), version))
    }

    fn on_chan_upgrade_try(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        ordering: Order,
        _connection_hops: &[ConnectionId],
        counterparty_version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        Self::check_ordering(ordering)?;
        parse_owner(counterparty_version)?;
        Ok((ModuleExtras::empty(), counterparty_version.clone()))
    }
}
