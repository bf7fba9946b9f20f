use interlink_core::channel::types::acknowledgement::{
    Acknowledgement, AcknowledgementStatus, StatusValue,
};
use interlink_core::channel::types::channel::{Counterparty, Order};
use interlink_core::channel::types::error::{ChannelError, PacketError};
use interlink_core::channel::types::packet::Packet;
use interlink_core::channel::types::Version;
use interlink_core::host::types::identifiers::{ChannelId, ConnectionId, PortId};
use interlink_core::primitives::prelude::*;
use interlink_core::primitives::Signer;
use interlink_core::router::module::Module;
use interlink_core::router::types::event::ModuleEvent;
use interlink_core::router::types::module::ModuleExtras;

pub const DUMMY_MODULE_ID: &str = "dummy";
pub const DUMMY_PORT_ID: &str = "dummy";
pub const DUMMY_VERSION: &str = "dummy-1";

/// An application accepting any channel, answering every packet with a
/// success acknowledgement unless told to fail.
#[derive(Clone, Debug, Default)]
pub struct DummyModule {
    reject_upgrades: bool,
    fail_receives: bool,
    upgrade_version: Option<Version>,
}

impl DummyModule {
    /// Vetoes every upgrade the counterparty proposes or answers.
    pub fn rejecting_upgrades(mut self) -> Self {
        self.reject_upgrades = true;
        self
    }

    /// Proposes `version` for every local upgrade, whatever was asked for.
    pub fn proposing_upgrade_version(mut self, version: Version) -> Self {
        self.upgrade_version = Some(version);
        self
    }

    /// Answers every packet with an error acknowledgement.
    pub fn failing_receives(mut self) -> Self {
        self.fail_receives = true;
        self
    }

    fn negotiate(version: &Version) -> Version {
        if version.is_empty() {
            Version::new(DUMMY_VERSION.to_string())
        } else {
            version.clone()
        }
    }

    fn upgrade_version(&self, version: &Version) -> Version {
        self.upgrade_version.clone().unwrap_or_else(|| version.clone())
    }

    fn check_upgrade(&self) -> Result<(), ChannelError> {
        if self.reject_upgrades {
            return Err(ChannelError::AppModule {
                description: "upgrade rejected by the application".to_string(),
            });
        }
        Ok(())
    }
}

pub fn dummy_success_ack() -> Acknowledgement {
    AcknowledgementStatus::success(StatusValue::new("AQ==").expect("Never fails")).into()
}

pub fn dummy_error_ack() -> Acknowledgement {
    AcknowledgementStatus::error(StatusValue::new("receive rejected").expect("Never fails")).into()
}

impl Module for DummyModule {
    fn on_chan_open_init_validate(
        &self,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        version: &Version,
    ) -> Result<Version, ChannelError> {
        Ok(Self::negotiate(version))
    }

    fn on_chan_open_init_execute(
        &mut self,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        Ok((ModuleExtras::empty(), Self::negotiate(version)))
    }

    fn on_chan_open_try_validate(
        &self,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<Version, ChannelError> {
        Ok(counterparty_version.clone())
    }

    fn on_chan_open_try_execute(
        &mut self,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        Ok((ModuleExtras::empty(), counterparty_version.clone()))
    }

    fn on_recv_packet_execute(
        &mut self,
        packet: &Packet,
        _relayer: &Signer,
    ) -> (ModuleExtras, Acknowledgement) {
        if self.fail_receives {
            let extras = ModuleExtras::empty()
                .with_log(format!("dummy: rejected packet {}", packet.seq_on_a));
            return (extras, dummy_error_ack());
        }

        let extras = ModuleExtras::empty().with_event(
            ModuleEvent::new("dummy_recv")
                .with_attribute(("sequence", packet.seq_on_a))
                .with_attribute(("channel", packet.chan_id_on_b.clone())),
        );

        (extras, dummy_success_ack())
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
        _ordering: Order,
        _connection_hops: &[ConnectionId],
        version: &Version,
    ) -> Result<Version, ChannelError> {
        Ok(self.upgrade_version(version))
    }

    fn on_chan_upgrade_init_execute(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _ordering: Order,
        _connection_hops: &[ConnectionId],
        version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        Ok((ModuleExtras::empty(), self.upgrade_version(version)))
    }

    fn on_chan_upgrade_try(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _ordering: Order,
        _connection_hops: &[ConnectionId],
        counterparty_version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        self.check_upgrade()?;
        Ok((ModuleExtras::empty(), counterparty_version.clone()))
    }

    fn on_chan_upgrade_ack(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty_version: &Version,
    ) -> Result<ModuleExtras, ChannelError> {
        self.check_upgrade()?;
        Ok(ModuleExtras::empty())
    }

    fn on_chan_upgrade_open(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        _ordering: Order,
        _connection_hops: &[ConnectionId],
        version: &Version,
    ) -> ModuleExtras {
        ModuleExtras::empty().with_log(format!("dummy: {port_id}/{channel_id} now runs {version}"))
    }
}
