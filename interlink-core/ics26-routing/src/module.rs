//! The trait that defines an application's behaviour within the channel layer.
use core::fmt::Debug;

use interlink_core_channel_types::acknowledgement::Acknowledgement;
use interlink_core_channel_types::channel::{Counterparty, IdentifiedChannelEnd, Order};
use interlink_core_channel_types::error::{ChannelError, PacketError};
use interlink_core_channel_types::packet::Packet;
use interlink_core_channel_types::Version;
use interlink_core_host_types::identifiers::{ChannelId, ConnectionId, PortId};
use interlink_core_router_types::module::ModuleExtras;
use interlink_primitives::Signer;

pub trait Module: Debug {
    fn on_chan_open_init_validate(
        &self,
        order: Order,
        connection_hops: &[ConnectionId],
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty: &Counterparty,
        version: &Version,
    ) -> Result<Version, ChannelError>;

    fn on_chan_open_init_execute(
        &mut self,
        order: Order,
        connection_hops: &[ConnectionId],
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty: &Counterparty,
        version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError>;

    fn on_chan_open_try_validate(
        &self,
        order: Order,
        connection_hops: &[ConnectionId],
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<Version, ChannelError>;

    fn on_chan_open_try_execute(
        &mut self,
        order: Order,
        connection_hops: &[ConnectionId],
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError>;

    /// Returns the channel the application considers active for the given
    /// connection and counterparty port, if it tracks one.
    ///
    /// Applications that bind a single channel to an owner (such as an
    /// account host) use this to opt into reopening: `ChanOpenTry` is then
    /// only accepted once that channel is closed.
    fn active_channel(
        &self,
        _connection_id: &ConnectionId,
        _counterparty_port_id: &PortId,
    ) -> Option<ChannelId> {
        None
    }

    /// Decides whether a new channel may replace the closed channel reported
    /// by [`Module::active_channel`].
    fn on_chan_open_try_reopen(
        &self,
        _closed_channel: &IdentifiedChannelEnd,
        _counterparty_version: &Version,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    fn on_chan_open_ack_validate(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty_version: &Version,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    fn on_chan_open_ack_execute(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty_version: &Version,
    ) -> Result<ModuleExtras, ChannelError> {
        Ok(ModuleExtras::empty())
    }

    fn on_chan_open_confirm_validate(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    fn on_chan_open_confirm_execute(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<ModuleExtras, ChannelError> {
        Ok(ModuleExtras::empty())
    }

    fn on_chan_close_init_validate(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    fn on_chan_close_init_execute(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<ModuleExtras, ChannelError> {
        Ok(ModuleExtras::empty())
    }

    fn on_chan_close_confirm_validate(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    fn on_chan_close_confirm_execute(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<ModuleExtras, ChannelError> {
        Ok(ModuleExtras::empty())
    }

    // Note: no `on_recv_packet_validate()`
    // the `onRecvPacket` callback always succeeds
    // if any error occurs, than an "error acknowledgement"
    // must be returned

    fn on_recv_packet_execute(
        &mut self,
        packet: &Packet,
        relayer: &Signer,
    ) -> (ModuleExtras, Acknowledgement);

    fn on_acknowledgement_packet_validate(
        &self,
        _packet: &Packet,
        _acknowledgement: &Acknowledgement,
        _relayer: &Signer,
    ) -> Result<(), PacketError>;

    fn on_acknowledgement_packet_execute(
        &mut self,
        _packet: &Packet,
        _acknowledgement: &Acknowledgement,
        _relayer: &Signer,
    ) -> (ModuleExtras, Result<(), PacketError>);

    /// Note: `MsgTimeout` and `MsgTimeoutOnClose` use the same callback

    fn on_timeout_packet_validate(
        &self,
        packet: &Packet,
        relayer: &Signer,
    ) -> Result<(), PacketError>;

    /// Note: `MsgTimeout` and `MsgTimeoutOnClose` use the same callback

    fn on_timeout_packet_execute(
        &mut self,
        packet: &Packet,
        relayer: &Signer,
    ) -> (ModuleExtras, Result<(), PacketError>);

    /// Checks a locally proposed upgrade and returns the version to
    /// propose. An error rejects the `ChanUpgradeInit` message.
    fn on_chan_upgrade_init_validate(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _ordering: Order,
        _connection_hops: &[ConnectionId],
        version: &Version,
    ) -> Result<Version, ChannelError> {
        Ok(version.clone())
    }

    fn on_chan_upgrade_init_execute(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _ordering: Order,
        _connection_hops: &[ConnectionId],
        version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        Ok((ModuleExtras::empty(), version.clone()))
    }

    /// Answers an upgrade proposed by the counterparty with the version
    /// this end runs after the upgrade. An error aborts the upgrade attempt
    /// instead of failing the message.
    fn on_chan_upgrade_try(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _ordering: Order,
        _connection_hops: &[ConnectionId],
        counterparty_version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        Ok((ModuleExtras::empty(), counterparty_version.clone()))
    }

    /// Accepts the version the counterparty settled on. An error aborts the
    /// upgrade attempt.
    fn on_chan_upgrade_ack(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty_version: &Version,
    ) -> Result<ModuleExtras, ChannelError> {
        Ok(ModuleExtras::empty())
    }

    /// Called once the upgraded fields are in force on the channel.
    fn on_chan_upgrade_open(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _ordering: Order,
        _connection_hops: &[ConnectionId],
        _version: &Version,
    ) -> ModuleExtras {
        ModuleExtras::empty()
    }

    /// Called when an upgrade attempt is aborted and the channel is back on
    /// its previous fields.
    fn on_chan_upgrade_restore(&mut self, _port_id: &PortId, _channel_id: &ChannelId) -> ModuleExtras {
        ModuleExtras::empty()
    }
}
