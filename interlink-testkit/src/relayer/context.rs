use core::mem;

use interlink_core::channel::handler::send_packet;
use interlink_core::channel::types::acknowledgement::Acknowledgement;
use interlink_core::channel::types::channel::{ChannelEnd, Order};
use interlink_core::channel::types::msgs::{
    ChannelMsg, MsgAcknowledgement, MsgChannelCloseConfirm, MsgChannelCloseInit, MsgChannelOpenAck,
    MsgChannelOpenConfirm, MsgChannelOpenInit, MsgChannelOpenTry, MsgChannelUpgradeAck,
    MsgChannelUpgradeCancel, MsgChannelUpgradeConfirm, MsgChannelUpgradeInit,
    MsgChannelUpgradeOpen, MsgChannelUpgradeTimeout, MsgChannelUpgradeTry, MsgRecvPacket,
    MsgTimeout, MsgTimeoutOnClose, PacketMsg, UpgradeMsg,
};
use interlink_core::channel::types::packet::Packet;
use interlink_core::channel::types::upgrade::{ErrorReceipt, Upgrade, UpgradeFields, UpgradeTimeout};
use interlink_core::channel::types::Version;
use interlink_core::commitment_types::commitment::CommitmentProofBytes;
use interlink_core::handler::types::events::IbcEvent;
use interlink_core::handler::types::msgs::MsgEnvelope;
use interlink_core::host::types::identifiers::{ChannelId, ClientId, ConnectionId, PortId, Sequence};
use interlink_core::host::types::path::{
    AckPath, ChannelCapabilityPath, ChannelEndPath, ChannelUpgradePath, CommitmentPath,
    ReceiptPath, SeqRecvPath, UpgradeErrorPath,
};
use interlink_core::host::ValidationContext;
use interlink_core::primitives::prelude::*;
use interlink_core::primitives::Signer;

use super::error::RelayerError;
use crate::fixtures::core::channel::{dummy_client_id, ConnectionConfig};
use crate::fixtures::core::signer::dummy_account_id;
use crate::testapp::core::router::MockRouter;
use crate::testapp::core::types::{port_channel_get, MockClientConfig, MockContext};

/// Two mock chains joined by an open connection, and a relayer moving
/// messages between them.
///
/// Every operation runs in one direction, from `A` to `B`, so that the
/// variable names match the fields of the messages. Use
/// [`reverse`](Self::reverse) to relay the other way.
#[derive(Debug)]
pub struct RelayerContext {
    ctx_a: MockContext,
    router_a: MockRouter,
    ctx_b: MockContext,
    router_b: MockRouter,
    client_id_on_a: ClientId,
    client_id_on_b: ClientId,
    conn_id_on_a: ConnectionId,
    conn_id_on_b: ConnectionId,
    signer: Signer,
}

impl RelayerContext {
    /// Joins `ctx_a` and `ctx_b` through `connection-0` on both ends, each
    /// tracking the other with the client `07-mock-0`.
    pub fn new(
        ctx_a: MockContext,
        router_a: MockRouter,
        ctx_b: MockContext,
        router_b: MockRouter,
    ) -> Self {
        let client_id = dummy_client_id();
        let conn_id = ConnectionId::zero();

        let ctx_a = ctx_a
            .with_client_config(
                MockClientConfig::builder()
                    .client_id(client_id.clone())
                    .latest_height(ctx_b.latest_height())
                    .latest_timestamp(ctx_b.latest_timestamp())
                    .build(),
            )
            .with_connection(conn_id.clone(), ConnectionConfig::builder().build());

        let ctx_b = ctx_b
            .with_client_config(
                MockClientConfig::builder()
                    .client_id(client_id.clone())
                    .latest_height(ctx_a.latest_height())
                    .latest_timestamp(ctx_a.latest_timestamp())
                    .build(),
            )
            .with_connection(conn_id.clone(), ConnectionConfig::builder().build());

        Self {
            ctx_a,
            router_a,
            ctx_b,
            router_b,
            client_id_on_a: client_id.clone(),
            client_id_on_b: client_id,
            conn_id_on_a: conn_id.clone(),
            conn_id_on_b: conn_id,
            signer: dummy_account_id(),
        }
    }

    /// Two default chains with the given routers.
    pub fn connected(router_a: MockRouter, router_b: MockRouter) -> Self {
        Self::new(
            MockContext::default(),
            router_a,
            MockContext::default(),
            router_b,
        )
    }

    /// Swaps the roles of the two chains.
    pub fn reverse(mut self) -> Self {
        mem::swap(&mut self.ctx_a, &mut self.ctx_b);
        mem::swap(&mut self.router_a, &mut self.router_b);
        mem::swap(&mut self.client_id_on_a, &mut self.client_id_on_b);
        mem::swap(&mut self.conn_id_on_a, &mut self.conn_id_on_b);
        self
    }

    pub fn get_ctx_a(&self) -> &MockContext {
        &self.ctx_a
    }

    pub fn get_ctx_b(&self) -> &MockContext {
        &self.ctx_b
    }

    pub fn get_ctx_a_mut(&mut self) -> &mut MockContext {
        &mut self.ctx_a
    }

    pub fn get_ctx_b_mut(&mut self) -> &mut MockContext {
        &mut self.ctx_b
    }

    pub fn get_router_a_mut(&mut self) -> &mut MockRouter {
        &mut self.router_a
    }

    pub fn get_router_b_mut(&mut self) -> &mut MockRouter {
        &mut self.router_b
    }

    pub fn conn_id_on_a(&self) -> &ConnectionId {
        &self.conn_id_on_a
    }

    pub fn conn_id_on_b(&self) -> &ConnectionId {
        &self.conn_id_on_b
    }

    /// Lets the client on `A` learn the latest block of `B`.
    pub fn sync_client_on_a(&mut self) {
        self.ctx_a.verifier.update_client(
            self.client_id_on_a.clone(),
            self.ctx_b.latest_height(),
            self.ctx_b.latest_timestamp(),
        );
    }

    /// Lets the client on `B` learn the latest block of `A`.
    pub fn sync_client_on_b(&mut self) {
        self.ctx_b.verifier.update_client(
            self.client_id_on_b.clone(),
            self.ctx_a.latest_height(),
            self.ctx_a.latest_timestamp(),
        );
    }

    /// Reads a channel end of `A`.
    pub fn channel_end_on_a(
        &self,
        port_id: &PortId,
        chan_id: &ChannelId,
    ) -> Result<ChannelEnd, RelayerError> {
        self.ctx_a
            .channel_end(&ChannelEndPath::new(port_id, chan_id))
            .map_err(RelayerError::QueryFailed)
    }

    /// Reads a channel end of `B`.
    pub fn channel_end_on_b(
        &self,
        port_id: &PortId,
        chan_id: &ChannelId,
    ) -> Result<ChannelEnd, RelayerError> {
        self.ctx_b
            .channel_end(&ChannelEndPath::new(port_id, chan_id))
            .map_err(RelayerError::QueryFailed)
    }

    /// Brings the client of `B` on `A` up to date, then delivers `msg` to `A`.
    pub fn deliver_on_a(&mut self, msg: MsgEnvelope) -> Result<(), RelayerError> {
        self.sync_client_on_a();
        self.ctx_a
            .deliver(&mut self.router_a, msg)
            .map_err(RelayerError::TransactionFailed)
    }

    /// Brings the client of `A` on `B` up to date, then delivers `msg` to `B`.
    pub fn deliver_on_b(&mut self, msg: MsgEnvelope) -> Result<(), RelayerError> {
        self.sync_client_on_b();
        self.ctx_b
            .deliver(&mut self.router_b, msg)
            .map_err(RelayerError::TransactionFailed)
    }

    /// `A` initiates a channel with port identifier with the other end on `B`.
    /// Returns the channel identifier of `A`.
    pub fn channel_open_init_on_a(
        &mut self,
        port_id_on_a: PortId,
        port_id_on_b: PortId,
        ordering: Order,
        version_proposal: Version,
    ) -> Result<ChannelId, RelayerError> {
        let msg = MsgChannelOpenInit {
            port_id_on_a,
            connection_hops_on_a: vec![self.conn_id_on_a.clone()],
            port_id_on_b,
            ordering,
            signer: self.signer.clone(),
            version_proposal,
        };

        self.ctx_a
            .deliver(&mut self.router_a, MsgEnvelope::Channel(ChannelMsg::OpenInit(msg)))
            .map_err(RelayerError::TransactionFailed)?;

        match self.ctx_a.last_event() {
            Some(IbcEvent::OpenInitChannel(event)) => Ok(event.chan_id_on_a),
            _ => Err(RelayerError::MissingEvent {
                expected: "channel_open_init",
            }),
        }
    }

    /// `B` receives the channel opening attempt by `A` after `A` initiates
    /// the channel. Returns the channel identifier of `B`.
    pub fn channel_open_try_on_b(
        &mut self,
        port_id_on_a: PortId,
        chan_id_on_a: ChannelId,
        port_id_on_b: PortId,
    ) -> Result<ChannelId, RelayerError> {
        let chan_end_on_a = self.channel_end_on_a(&port_id_on_a, &chan_id_on_a)?;

        let msg = MsgChannelOpenTry {
            port_id_on_b,
            connection_hops_on_b: vec![self.conn_id_on_b.clone()],
            port_id_on_a: port_id_on_a.clone(),
            proof_chan_end_on_a: self
                .ctx_a
                .prove(ChannelEndPath::new(&port_id_on_a, &chan_id_on_a)),
            chan_id_on_a,
            version_supported_on_a: chan_end_on_a.version.clone(),
            proof_height_on_a: self.ctx_a.latest_height(),
            ordering: chan_end_on_a.ordering,
            signer: self.signer.clone(),
        };

        self.deliver_on_b(MsgEnvelope::Channel(ChannelMsg::OpenTry(msg)))?;

        // a reopened channel may be followed by module events
        self.ctx_b
            .get_events()
            .into_iter()
            .rev()
            .find_map(|event| match event {
                IbcEvent::OpenTryChannel(event) => Some(event.chan_id_on_b),
                _ => None,
            })
            .ok_or(RelayerError::MissingEvent {
                expected: "channel_open_try",
            })
    }

    /// `A` receives `B`'s acknowledgement that `B` received the channel
    /// opening attempt by `A`.
    pub fn channel_open_ack_on_a(
        &mut self,
        port_id_on_a: PortId,
        chan_id_on_a: ChannelId,
        port_id_on_b: PortId,
        chan_id_on_b: ChannelId,
    ) -> Result<(), RelayerError> {
        let chan_end_on_b = self.channel_end_on_b(&port_id_on_b, &chan_id_on_b)?;

        let msg = MsgChannelOpenAck {
            port_id_on_a,
            chan_id_on_a,
            proof_chan_end_on_b: self
                .ctx_b
                .prove(ChannelEndPath::new(&port_id_on_b, &chan_id_on_b)),
            chan_id_on_b,
            version_on_b: chan_end_on_b.version.clone(),
            proof_height_on_b: self.ctx_b.latest_height(),
            signer: self.signer.clone(),
        };

        self.deliver_on_a(MsgEnvelope::Channel(ChannelMsg::OpenAck(msg)))
    }

    /// `B` receives the confirmation from `A` that the channel is open on
    /// `A`.
    pub fn channel_open_confirm_on_b(
        &mut self,
        port_id_on_a: PortId,
        chan_id_on_a: ChannelId,
        port_id_on_b: PortId,
        chan_id_on_b: ChannelId,
    ) -> Result<(), RelayerError> {
        let msg = MsgChannelOpenConfirm {
            port_id_on_b,
            chan_id_on_b,
            proof_chan_end_on_a: self
                .ctx_a
                .prove(ChannelEndPath::new(&port_id_on_a, &chan_id_on_a)),
            proof_height_on_a: self.ctx_a.latest_height(),
            signer: self.signer.clone(),
        };

        self.deliver_on_b(MsgEnvelope::Channel(ChannelMsg::OpenConfirm(msg)))
    }

    /// `A` initiates the closing of a channel.
    pub fn channel_close_init_on_a(
        &mut self,
        port_id_on_a: PortId,
        chan_id_on_a: ChannelId,
    ) -> Result<(), RelayerError> {
        let msg = MsgChannelCloseInit {
            port_id_on_a,
            chan_id_on_a,
            signer: self.signer.clone(),
        };

        self.ctx_a
            .deliver(&mut self.router_a, MsgEnvelope::Channel(ChannelMsg::CloseInit(msg)))
            .map_err(RelayerError::TransactionFailed)
    }

    /// `B` receives the proof that `A` closed the channel.
    pub fn channel_close_confirm_on_b(
        &mut self,
        port_id_on_a: PortId,
        chan_id_on_a: ChannelId,
        port_id_on_b: PortId,
        chan_id_on_b: ChannelId,
    ) -> Result<(), RelayerError> {
        let chan_end_on_a = self.channel_end_on_a(&port_id_on_a, &chan_id_on_a)?;

        let msg = MsgChannelCloseConfirm {
            port_id_on_b,
            chan_id_on_b,
            proof_chan_end_on_a: self
                .ctx_a
                .prove(ChannelEndPath::new(&port_id_on_a, &chan_id_on_a)),
            proof_height_on_a: self.ctx_a.latest_height(),
            counterparty_upgrade_sequence: chan_end_on_a.upgrade_sequence,
            signer: self.signer.clone(),
        };

        self.deliver_on_b(MsgEnvelope::Channel(ChannelMsg::CloseConfirm(msg)))
    }

    /// Runs the four steps of the opening handshake, started by `A`.
    /// Returns the channel identifiers of `A` and `B`.
    pub fn open_channel(
        &mut self,
        port_id_on_a: PortId,
        port_id_on_b: PortId,
        ordering: Order,
        version_proposal: Version,
    ) -> Result<(ChannelId, ChannelId), RelayerError> {
        let chan_id_on_a = self.channel_open_init_on_a(
            port_id_on_a.clone(),
            port_id_on_b.clone(),
            ordering,
            version_proposal,
        )?;

        let chan_id_on_b = self.channel_open_try_on_b(
            port_id_on_a.clone(),
            chan_id_on_a.clone(),
            port_id_on_b.clone(),
        )?;

        self.channel_open_ack_on_a(
            port_id_on_a.clone(),
            chan_id_on_a.clone(),
            port_id_on_b.clone(),
            chan_id_on_b.clone(),
        )?;

        self.channel_open_confirm_on_b(
            port_id_on_a,
            chan_id_on_a.clone(),
            port_id_on_b,
            chan_id_on_b.clone(),
        )?;

        Ok((chan_id_on_a, chan_id_on_b))
    }

    /// A channel is closed by `A` towards `B` using the closing handshake.
    pub fn close_channel(
        &mut self,
        port_id_on_a: PortId,
        chan_id_on_a: ChannelId,
        port_id_on_b: PortId,
        chan_id_on_b: ChannelId,
    ) -> Result<(), RelayerError> {
        self.channel_close_init_on_a(port_id_on_a.clone(), chan_id_on_a.clone())?;
        self.channel_close_confirm_on_b(port_id_on_a, chan_id_on_a, port_id_on_b, chan_id_on_b)
    }

    /// The application owning the channel of `packet` on `A` sends it.
    pub fn send_packet_on_a(&mut self, packet: Packet) -> Result<(), RelayerError> {
        let capability_path = ChannelCapabilityPath::new(&packet.port_id_on_a, &packet.chan_id_on_a);

        let capability = self.ctx_a.get_capability(&capability_path).ok_or_else(|| {
            RelayerError::CapabilityNotFound {
                port_id: packet.port_id_on_a.clone(),
                channel_id: packet.chan_id_on_a.clone(),
            }
        })?;

        send_packet(&mut self.ctx_a, &capability, packet).map_err(RelayerError::TransactionFailed)?;

        self.ctx_a.advance_block();

        Ok(())
    }

    /// `B` receives a packet from an IBC module on `A`.
    /// Returns `B`'s acknowledgement of receipt.
    pub fn packet_recv_on_b(&mut self, packet: Packet) -> Result<Acknowledgement, RelayerError> {
        let events_before = self.ctx_b.get_events().len();

        let msg = MsgRecvPacket {
            proof_commitment_on_a: self.ctx_a.prove(CommitmentPath::new(
                &packet.port_id_on_a,
                &packet.chan_id_on_a,
                packet.seq_on_a,
            )),
            proof_height_on_a: self.ctx_a.latest_height(),
            packet,
            signer: self.signer.clone(),
        };

        self.deliver_on_b(MsgEnvelope::Packet(PacketMsg::Recv(msg)))?;

        self.ctx_b
            .get_events()
            .into_iter()
            .skip(events_before)
            .find_map(|event| match event {
                IbcEvent::WriteAcknowledgement(event) => Some(event.acknowledgement),
                _ => None,
            })
            .ok_or(RelayerError::MissingEvent {
                expected: "write_acknowledgement",
            })
    }

    /// `A` receives the acknowledgement from `B` that `B` received the
    /// packet from `A`.
    pub fn packet_ack_on_a(
        &mut self,
        packet: Packet,
        acknowledgement: Acknowledgement,
    ) -> Result<(), RelayerError> {
        let msg = MsgAcknowledgement {
            proof_acked_on_b: self.ctx_b.prove(AckPath::new(
                &packet.port_id_on_b,
                &packet.chan_id_on_b,
                packet.seq_on_a,
            )),
            proof_height_on_b: self.ctx_b.latest_height(),
            packet,
            acknowledgement,
            signer: self.signer.clone(),
        };

        self.deliver_on_a(MsgEnvelope::Packet(PacketMsg::Ack(msg)))
    }

    /// Proof that `B` has not received `packet`: the next receive sequence
    /// on an ordered channel, the absence of a receipt otherwise.
    fn prove_unreceived_on_b(
        &self,
        packet: &Packet,
    ) -> Result<(CommitmentProofBytes, Sequence), RelayerError> {
        let chan_end_on_a = self.channel_end_on_a(&packet.port_id_on_a, &packet.chan_id_on_a)?;

        match chan_end_on_a.ordering {
            Order::Ordered => {
                let seq_recv_path = SeqRecvPath::new(&packet.port_id_on_b, &packet.chan_id_on_b);
                let next_seq_recv_on_b = self
                    .ctx_b
                    .get_next_sequence_recv(&seq_recv_path)
                    .map_err(RelayerError::QueryFailed)?;

                Ok((self.ctx_b.prove(seq_recv_path), next_seq_recv_on_b))
            }
            _ => {
                let receipt_path =
                    ReceiptPath::new(&packet.port_id_on_b, &packet.chan_id_on_b, packet.seq_on_a);

                Ok((self.ctx_b.prove(receipt_path), packet.seq_on_a))
            }
        }
    }

    /// `A` learns that `B` has not received `packet` before its timeout.
    /// `B` must have moved past the timeout already.
    pub fn packet_timeout_on_a(&mut self, packet: Packet) -> Result<(), RelayerError> {
        let (proof_unreceived_on_b, next_seq_recv_on_b) = self.prove_unreceived_on_b(&packet)?;

        let msg = MsgTimeout {
            next_seq_recv_on_b,
            proof_unreceived_on_b,
            proof_height_on_b: self.ctx_b.latest_height(),
            packet,
            signer: self.signer.clone(),
        };

        self.deliver_on_a(MsgEnvelope::Packet(PacketMsg::Timeout(msg)))
    }

    /// `A` learns that `B` closed the channel without receiving `packet`.
    pub fn packet_timeout_on_close_on_a(&mut self, packet: Packet) -> Result<(), RelayerError> {
        let (proof_unreceived_on_b, next_seq_recv_on_b) = self.prove_unreceived_on_b(&packet)?;
        let chan_end_on_b = self.channel_end_on_b(&packet.port_id_on_b, &packet.chan_id_on_b)?;

        let msg = MsgTimeoutOnClose {
            next_seq_recv_on_b,
            proof_unreceived_on_b,
            proof_close_on_b: self
                .ctx_b
                .prove(ChannelEndPath::new(&packet.port_id_on_b, &packet.chan_id_on_b)),
            proof_height_on_b: self.ctx_b.latest_height(),
            counterparty_upgrade_sequence: chan_end_on_b.upgrade_sequence,
            packet,
            signer: self.signer.clone(),
        };

        self.deliver_on_a(MsgEnvelope::Packet(PacketMsg::TimeoutOnClose(msg)))
    }

    /// Sends `packet` from `A`, delivers it to `B` and brings the
    /// acknowledgement back to `A`. Returns the acknowledgement.
    pub fn relay_packet(&mut self, packet: Packet) -> Result<Acknowledgement, RelayerError> {
        self.send_packet_on_a(packet.clone())?;

        let acknowledgement = self.packet_recv_on_b(packet.clone())?;

        self.packet_ack_on_a(packet, acknowledgement.clone())?;

        Ok(acknowledgement)
    }

    fn upgrade_on(
        ctx: &MockContext,
        port_id: &PortId,
        chan_id: &ChannelId,
    ) -> Result<Upgrade, RelayerError> {
        ctx.channel_upgrade(&ChannelUpgradePath::new(port_id, chan_id))
            .map_err(RelayerError::QueryFailed)?
            .ok_or_else(|| RelayerError::MissingUpgradeData {
                port_id: port_id.clone(),
                channel_id: chan_id.clone(),
                kind: "upgrade",
            })
    }

    fn error_receipt_on(
        ctx: &MockContext,
        port_id: &PortId,
        chan_id: &ChannelId,
    ) -> Result<ErrorReceipt, RelayerError> {
        port_channel_get(&ctx.ibc_store.lock().upgrade_errors, port_id, chan_id)
            .cloned()
            .ok_or_else(|| RelayerError::MissingUpgradeData {
                port_id: port_id.clone(),
                channel_id: chan_id.clone(),
                kind: "error receipt",
            })
    }

    fn counterparty_of(
        chan_end: &ChannelEnd,
        port_id: &PortId,
        chan_id: &ChannelId,
    ) -> Result<(PortId, ChannelId), RelayerError> {
        let counterparty = chan_end.counterparty();

        let chan_id_on_cp = counterparty.channel_id().cloned().ok_or_else(|| {
            RelayerError::MissingCounterpartyChannel {
                port_id: port_id.clone(),
                channel_id: chan_id.clone(),
            }
        })?;

        Ok((counterparty.port_id().clone(), chan_id_on_cp))
    }

    /// `A` proposes to upgrade its channel to `fields`.
    pub fn upgrade_init_on_a(
        &mut self,
        port_id_on_a: PortId,
        chan_id_on_a: ChannelId,
        fields: UpgradeFields,
        timeout: UpgradeTimeout,
    ) -> Result<(), RelayerError> {
        let msg = MsgChannelUpgradeInit {
            port_id_on_a,
            chan_id_on_a,
            fields,
            timeout,
            signer: self.signer.clone(),
        };

        self.ctx_a
            .deliver(&mut self.router_a, MsgEnvelope::Upgrade(UpgradeMsg::Init(msg)))
            .map_err(RelayerError::TransactionFailed)
    }

    /// `B` answers the upgrade proposed by `A` on the counterparty of its
    /// channel.
    pub fn upgrade_try_on_b(
        &mut self,
        port_id_on_b: PortId,
        chan_id_on_b: ChannelId,
    ) -> Result<(), RelayerError> {
        let chan_end_on_b = self.channel_end_on_b(&port_id_on_b, &chan_id_on_b)?;
        let (port_id_on_a, chan_id_on_a) =
            Self::counterparty_of(&chan_end_on_b, &port_id_on_b, &chan_id_on_b)?;

        let chan_end_on_a = self.channel_end_on_a(&port_id_on_a, &chan_id_on_a)?;
        let upgrade_on_a = Self::upgrade_on(&self.ctx_a, &port_id_on_a, &chan_id_on_a)?;

        let msg = MsgChannelUpgradeTry {
            port_id_on_b,
            chan_id_on_b,
            proposed_connection_hops: vec![self.conn_id_on_b.clone()],
            counterparty_upgrade_fields: upgrade_on_a.fields,
            counterparty_upgrade_timeout: upgrade_on_a.timeout,
            counterparty_upgrade_sequence: chan_end_on_a.upgrade_sequence,
            proof_chan_end_on_a: self
                .ctx_a
                .prove(ChannelEndPath::new(&port_id_on_a, &chan_id_on_a)),
            proof_upgrade_on_a: self
                .ctx_a
                .prove(ChannelUpgradePath::new(&port_id_on_a, &chan_id_on_a)),
            proof_height_on_a: self.ctx_a.latest_height(),
            signer: self.signer.clone(),
        };

        self.deliver_on_b(MsgEnvelope::Upgrade(UpgradeMsg::Try(msg)))
    }

    /// `A` learns the upgrade `B` answered with and starts flushing.
    pub fn upgrade_ack_on_a(
        &mut self,
        port_id_on_a: PortId,
        chan_id_on_a: ChannelId,
    ) -> Result<(), RelayerError> {
        let chan_end_on_a = self.channel_end_on_a(&port_id_on_a, &chan_id_on_a)?;
        let (port_id_on_b, chan_id_on_b) =
            Self::counterparty_of(&chan_end_on_a, &port_id_on_a, &chan_id_on_a)?;

        let msg = MsgChannelUpgradeAck {
            port_id_on_a,
            chan_id_on_a,
            counterparty_upgrade: Self::upgrade_on(&self.ctx_b, &port_id_on_b, &chan_id_on_b)?,
            proof_chan_end_on_b: self
                .ctx_b
                .prove(ChannelEndPath::new(&port_id_on_b, &chan_id_on_b)),
            proof_upgrade_on_b: self
                .ctx_b
                .prove(ChannelUpgradePath::new(&port_id_on_b, &chan_id_on_b)),
            proof_height_on_b: self.ctx_b.latest_height(),
            signer: self.signer.clone(),
        };

        self.deliver_on_a(MsgEnvelope::Upgrade(UpgradeMsg::Ack(msg)))
    }

    /// `B` learns that `A` is flushing and starts flushing too.
    pub fn upgrade_confirm_on_b(
        &mut self,
        port_id_on_b: PortId,
        chan_id_on_b: ChannelId,
    ) -> Result<(), RelayerError> {
        let chan_end_on_b = self.channel_end_on_b(&port_id_on_b, &chan_id_on_b)?;
        let (port_id_on_a, chan_id_on_a) =
            Self::counterparty_of(&chan_end_on_b, &port_id_on_b, &chan_id_on_b)?;

        let chan_end_on_a = self.channel_end_on_a(&port_id_on_a, &chan_id_on_a)?;

        let msg = MsgChannelUpgradeConfirm {
            port_id_on_b,
            chan_id_on_b,
            counterparty_chan_state: chan_end_on_a.state,
            counterparty_upgrade: Self::upgrade_on(&self.ctx_a, &port_id_on_a, &chan_id_on_a)?,
            proof_chan_end_on_a: self
                .ctx_a
                .prove(ChannelEndPath::new(&port_id_on_a, &chan_id_on_a)),
            proof_upgrade_on_a: self
                .ctx_a
                .prove(ChannelUpgradePath::new(&port_id_on_a, &chan_id_on_a)),
            proof_height_on_a: self.ctx_a.latest_height(),
            signer: self.signer.clone(),
        };

        self.deliver_on_b(MsgEnvelope::Upgrade(UpgradeMsg::Confirm(msg)))
    }

    /// `A` commits its upgrade once `B` is done flushing or already
    /// committed.
    pub fn upgrade_open_on_a(
        &mut self,
        port_id_on_a: PortId,
        chan_id_on_a: ChannelId,
    ) -> Result<(), RelayerError> {
        let chan_end_on_a = self.channel_end_on_a(&port_id_on_a, &chan_id_on_a)?;
        let (port_id_on_b, chan_id_on_b) =
            Self::counterparty_of(&chan_end_on_a, &port_id_on_a, &chan_id_on_a)?;

        let msg = MsgChannelUpgradeOpen {
            port_id: port_id_on_a,
            chan_id: chan_id_on_a,
            counterparty_channel: self.channel_end_on_b(&port_id_on_b, &chan_id_on_b)?,
            proof_chan_end_on_cp: self
                .ctx_b
                .prove(ChannelEndPath::new(&port_id_on_b, &chan_id_on_b)),
            proof_height_on_cp: self.ctx_b.latest_height(),
            signer: self.signer.clone(),
        };

        self.deliver_on_a(MsgEnvelope::Upgrade(UpgradeMsg::Open(msg)))
    }

    /// `A` abandons its upgrade after `B` wrote an error receipt.
    pub fn upgrade_cancel_on_a(
        &mut self,
        port_id_on_a: PortId,
        chan_id_on_a: ChannelId,
    ) -> Result<(), RelayerError> {
        let chan_end_on_a = self.channel_end_on_a(&port_id_on_a, &chan_id_on_a)?;
        let (port_id_on_b, chan_id_on_b) =
            Self::counterparty_of(&chan_end_on_a, &port_id_on_a, &chan_id_on_a)?;

        let msg = MsgChannelUpgradeCancel {
            port_id: port_id_on_a,
            chan_id: chan_id_on_a,
            error_receipt: Self::error_receipt_on(&self.ctx_b, &port_id_on_b, &chan_id_on_b)?,
            proof_error_receipt: self
                .ctx_b
                .prove(UpgradeErrorPath::new(&port_id_on_b, &chan_id_on_b)),
            proof_height: self.ctx_b.latest_height(),
            signer: self.signer.clone(),
        };

        self.deliver_on_a(MsgEnvelope::Upgrade(UpgradeMsg::Cancel(msg)))
    }

    /// `A` abandons its upgrade because `B` moved past the upgrade timeout
    /// without committing.
    pub fn upgrade_timeout_on_a(
        &mut self,
        port_id_on_a: PortId,
        chan_id_on_a: ChannelId,
    ) -> Result<(), RelayerError> {
        let chan_end_on_a = self.channel_end_on_a(&port_id_on_a, &chan_id_on_a)?;
        let (port_id_on_b, chan_id_on_b) =
            Self::counterparty_of(&chan_end_on_a, &port_id_on_a, &chan_id_on_a)?;

        let msg = MsgChannelUpgradeTimeout {
            port_id: port_id_on_a,
            chan_id: chan_id_on_a,
            counterparty_channel: self.channel_end_on_b(&port_id_on_b, &chan_id_on_b)?,
            proof_chan_end_on_cp: self
                .ctx_b
                .prove(ChannelEndPath::new(&port_id_on_b, &chan_id_on_b)),
            proof_height_on_cp: self.ctx_b.latest_height(),
            signer: self.signer.clone(),
        };

        self.deliver_on_a(MsgEnvelope::Upgrade(UpgradeMsg::Timeout(msg)))
    }

    /// Runs an upgrade started by `A` on a channel with no packets in
    /// flight, up to both ends running the new fields.
    pub fn upgrade_channel(
        &mut self,
        port_id_on_a: PortId,
        chan_id_on_a: ChannelId,
        fields: UpgradeFields,
        timeout: UpgradeTimeout,
    ) -> Result<(), RelayerError> {
        let chan_end_on_a = self.channel_end_on_a(&port_id_on_a, &chan_id_on_a)?;
        let (port_id_on_b, chan_id_on_b) =
            Self::counterparty_of(&chan_end_on_a, &port_id_on_a, &chan_id_on_a)?;

        self.upgrade_init_on_a(port_id_on_a.clone(), chan_id_on_a.clone(), fields, timeout)?;
        self.upgrade_try_on_b(port_id_on_b.clone(), chan_id_on_b.clone())?;
        self.upgrade_ack_on_a(port_id_on_a.clone(), chan_id_on_a.clone())?;
        self.upgrade_confirm_on_b(port_id_on_b, chan_id_on_b)?;
        self.upgrade_open_on_a(port_id_on_a, chan_id_on_a)
    }
}
