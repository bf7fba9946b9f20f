//! Implementation of a host context mock. Used in testing the channel,
//! packet and upgrade handlers.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use core::time::Duration;

use interlink_core::channel::types::channel::ChannelEnd;
use interlink_core::channel::types::commitment::{AcknowledgementCommitment, PacketCommitment};
use interlink_core::channel::types::packet::Receipt;
use interlink_core::channel::types::upgrade::{ErrorReceipt, Upgrade};
use interlink_core::client_types::Height;
use interlink_core::commitment_types::commitment::{CommitmentPrefix, CommitmentProofBytes};
use interlink_core::connection_types::ConnectionEnd;
use interlink_core::entrypoint::dispatch;
use interlink_core::handler::types::error::ContextError;
use interlink_core::handler::types::events::IbcEvent;
use interlink_core::handler::types::msgs::MsgEnvelope;
use interlink_core::host::types::capability::Capability;
use interlink_core::host::types::identifiers::{ChannelId, ClientId, ConnectionId, PortId, Sequence};
use interlink_core::host::types::path::Path;
use interlink_core::primitives::prelude::*;
use interlink_core::primitives::proto::Protobuf;
use interlink_core::primitives::Timestamp;
use interlink_core::router::router::Router;
use parking_lot::Mutex;
use typed_builder::TypedBuilder;

use super::verifier::{membership_proof, non_membership_proof, MockProofVerifier};
use crate::fixtures::core::context::MockContextConfig;

pub const DEFAULT_BLOCK_TIME_SECS: u64 = 3;

pub type PortChannelIdMap<V> = BTreeMap<PortId, BTreeMap<ChannelId, V>>;

/// An object that stores all channel related data.
#[derive(Clone, Debug, Default)]
pub struct MockIbcStore {
    /// All the connections in the store. The channel layer only reads them.
    pub connections: BTreeMap<ConnectionId, ConnectionEnd>,

    /// Counter for channel identifiers (see `increase_channel_counter`).
    pub channel_ids_counter: u64,

    /// All the channels in the store.
    pub channels: PortChannelIdMap<ChannelEnd>,

    /// Tracks the sequence number for the next packet to be sent.
    pub next_sequence_send: PortChannelIdMap<Sequence>,

    /// Tracks the sequence number for the next packet to be received.
    pub next_sequence_recv: PortChannelIdMap<Sequence>,

    /// Tracks the sequence number for the next packet to be acknowledged.
    pub next_sequence_ack: PortChannelIdMap<Sequence>,

    pub packet_acknowledgement: PortChannelIdMap<BTreeMap<Sequence, AcknowledgementCommitment>>,

    /// Constant-size commitments to packets data fields
    pub packet_commitment: PortChannelIdMap<BTreeMap<Sequence, PacketCommitment>>,

    /// Used by unordered channel
    pub packet_receipt: PortChannelIdMap<BTreeMap<Sequence, Receipt>>,

    /// Upgrades in progress, as proposed or answered by this chain.
    pub channel_upgrades: PortChannelIdMap<Upgrade>,

    /// Upgrades of the counterparty learnt while flushing.
    pub counterparty_upgrades: PortChannelIdMap<Upgrade>,

    /// Last error receipt of each channel.
    pub upgrade_errors: PortChannelIdMap<ErrorReceipt>,

    /// Claimed channel capabilities.
    pub capabilities: PortChannelIdMap<Capability>,

    /// Counter for minting capabilities.
    pub capability_counter: u64,

    /// Emitted events in order
    pub events: Vec<IbcEvent>,

    /// Logs of the channel layer and its modules
    pub logs: Vec<String>,
}

impl MockIbcStore {
    /// Returns the bytes stored at `path`, encoded the way the channel
    /// engine expects to find them under proof.
    pub fn value_at(&self, path: &Path) -> Option<Vec<u8>> {
        match path {
            Path::NextChannelSequence(_) => {
                Some(Sequence::from(self.channel_ids_counter).to_vec())
            }
            Path::ChannelEnd(path) => {
                port_channel_get(&self.channels, &path.0, &path.1).map(|c| c.clone().encode_vec())
            }
            Path::SeqSend(path) => {
                port_channel_get(&self.next_sequence_send, &path.0, &path.1).map(Sequence::to_vec)
            }
            Path::SeqRecv(path) => {
                port_channel_get(&self.next_sequence_recv, &path.0, &path.1).map(Sequence::to_vec)
            }
            Path::SeqAck(path) => {
                port_channel_get(&self.next_sequence_ack, &path.0, &path.1).map(Sequence::to_vec)
            }
            Path::Commitment(path) => {
                port_channel_get(&self.packet_commitment, &path.port_id, &path.channel_id)
                    .and_then(|commitments| commitments.get(&path.sequence))
                    .map(|c| c.clone().into_vec())
            }
            Path::Ack(path) => {
                port_channel_get(&self.packet_acknowledgement, &path.port_id, &path.channel_id)
                    .and_then(|acks| acks.get(&path.sequence))
                    .map(|c| c.clone().into_vec())
            }
            Path::Receipt(path) => {
                port_channel_get(&self.packet_receipt, &path.port_id, &path.channel_id)
                    .and_then(|receipts| receipts.get(&path.sequence))
                    .filter(|receipt| receipt.is_ok())
                    .map(|_| vec![1])
            }
            Path::ChannelUpgrade(path) => port_channel_get(&self.channel_upgrades, &path.0, &path.1)
                .map(|u| u.clone().encode_vec()),
            Path::CounterpartyUpgrade(path) => {
                port_channel_get(&self.counterparty_upgrades, &path.0, &path.1)
                    .map(|u| u.clone().encode_vec())
            }
            Path::UpgradeError(path) => port_channel_get(&self.upgrade_errors, &path.0, &path.1)
                .map(|e| e.clone().encode_vec()),
            Path::ChannelCapability(path) => {
                port_channel_get(&self.capabilities, &path.0, &path.1)
                    .map(|c| c.index().to_be_bytes().to_vec())
            }
        }
    }
}

pub(crate) fn port_channel_get<'a, V>(
    map: &'a PortChannelIdMap<V>,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Option<&'a V> {
    map.get(port_id).and_then(|channels| channels.get(channel_id))
}

pub(crate) fn port_channel_insert<V>(
    map: &mut PortChannelIdMap<V>,
    port_id: &PortId,
    channel_id: &ChannelId,
    value: V,
) {
    map.entry(port_id.clone())
        .or_default()
        .insert(channel_id.clone(), value);
}

pub(crate) fn port_channel_remove<V>(
    map: &mut PortChannelIdMap<V>,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Option<V> {
    map.get_mut(port_id)
        .and_then(|channels| channels.remove(channel_id))
}

/// A context implementing the dependencies necessary for testing the
/// channel layer.
#[derive(Debug)]
pub struct MockContext {
    /// Height of the latest block of the host chain.
    pub host_height: Height,

    /// Time of the latest block of the host chain.
    pub host_timestamp: Timestamp,

    /// Average time duration between blocks
    pub block_time: Duration,

    /// Prefix under which this chain keeps the values it proves.
    pub commitment_prefix: CommitmentPrefix,

    /// The light clients of the counterparty chains.
    pub verifier: MockProofVerifier,

    /// An object that stores all channel related data.
    pub ibc_store: Arc<Mutex<MockIbcStore>>,
}

#[derive(Debug, TypedBuilder)]
pub struct MockClientConfig {
    client_id: ClientId,
    latest_height: Height,
    #[builder(default)]
    consensus_state_heights: Vec<Height>,
    #[builder(default = Timestamp::from_nanoseconds(0))]
    latest_timestamp: Timestamp,
    #[builder(default = false)]
    frozen: bool,
}

/// Returns a MockContext with bare minimum initialization: no clients, no
/// connections and no channels are present, and the chain has Height(5).
impl Default for MockContext {
    fn default() -> Self {
        MockContextConfig::builder().build()
    }
}

/// A manual clone impl is provided because the tests are oblivious to the fact that the `ibc_store`
/// is a shared ptr.
impl Clone for MockContext {
    fn clone(&self) -> Self {
        let ibc_store = {
            let ibc_store = self.ibc_store.lock().clone();
            Arc::new(Mutex::new(ibc_store))
        };

        Self {
            host_height: self.host_height,
            host_timestamp: self.host_timestamp,
            block_time: self.block_time,
            commitment_prefix: self.commitment_prefix.clone(),
            verifier: self.verifier.clone(),
            ibc_store,
        }
    }
}

/// Implementation of internal interface for use in testing. The methods in this interface should
/// _not_ be accessible to any handler.
impl MockContext {
    /// Associates a client record to this context. Consensus states below
    /// the latest height are stamped one block time apart.
    pub fn with_client_config(mut self, client: MockClientConfig) -> Self {
        let latest_nanos = client.latest_timestamp.nanoseconds();
        let block_nanos = u64::try_from(self.block_time.as_nanos()).unwrap_or(u64::MAX);

        for height in client.consensus_state_heights {
            let blocks_behind = client
                .latest_height
                .revision_height()
                .saturating_sub(height.revision_height());
            let timestamp = Timestamp::from_nanoseconds(
                latest_nanos.saturating_sub(blocks_behind.saturating_mul(block_nanos)),
            );
            self.verifier
                .update_client(client.client_id.clone(), height, timestamp);
        }

        self.verifier.update_client(
            client.client_id.clone(),
            client.latest_height,
            client.latest_timestamp,
        );

        if client.frozen {
            self.verifier.freeze_client(&client.client_id);
        }

        self
    }

    /// Associates a connection to this context.
    pub fn with_connection(self, connection_id: ConnectionId, connection_end: ConnectionEnd) -> Self {
        self.ibc_store
            .lock()
            .connections
            .insert(connection_id, connection_end);
        self
    }

    /// Associates a channel (in an arbitrary state) to this context.
    pub fn with_channel(self, port_id: PortId, chan_id: ChannelId, channel_end: ChannelEnd) -> Self {
        port_channel_insert(
            &mut self.ibc_store.lock().channels,
            &port_id,
            &chan_id,
            channel_end,
        );
        self
    }

    /// Associates a channel and claims its capability, as if the channel
    /// had been created through a handshake.
    pub fn with_owned_channel(
        self,
        port_id: PortId,
        chan_id: ChannelId,
        channel_end: ChannelEnd,
    ) -> Self {
        let ctx = self.with_channel(port_id.clone(), chan_id.clone(), channel_end);
        {
            let mut store = ctx.ibc_store.lock();
            store.capability_counter += 1;
            let capability = Capability::new(store.capability_counter);
            port_channel_insert(&mut store.capabilities, &port_id, &chan_id, capability);
            store.channel_ids_counter = store.channel_ids_counter.max(channel_counter(&chan_id));
        }
        ctx
    }

    pub fn with_send_sequence(self, port_id: PortId, chan_id: ChannelId, seq_number: Sequence) -> Self {
        port_channel_insert(
            &mut self.ibc_store.lock().next_sequence_send,
            &port_id,
            &chan_id,
            seq_number,
        );
        self
    }

    pub fn with_recv_sequence(self, port_id: PortId, chan_id: ChannelId, seq_number: Sequence) -> Self {
        port_channel_insert(
            &mut self.ibc_store.lock().next_sequence_recv,
            &port_id,
            &chan_id,
            seq_number,
        );
        self
    }

    pub fn with_ack_sequence(self, port_id: PortId, chan_id: ChannelId, seq_number: Sequence) -> Self {
        port_channel_insert(
            &mut self.ibc_store.lock().next_sequence_ack,
            &port_id,
            &chan_id,
            seq_number,
        );
        self
    }

    pub fn with_packet_commitment(
        self,
        port_id: PortId,
        chan_id: ChannelId,
        seq: Sequence,
        data: PacketCommitment,
    ) -> Self {
        self.ibc_store
            .lock()
            .packet_commitment
            .entry(port_id)
            .or_default()
            .entry(chan_id)
            .or_default()
            .insert(seq, data);
        self
    }

    pub fn with_channel_upgrade(self, port_id: PortId, chan_id: ChannelId, upgrade: Upgrade) -> Self {
        port_channel_insert(
            &mut self.ibc_store.lock().channel_upgrades,
            &port_id,
            &chan_id,
            upgrade,
        );
        self
    }

    pub fn with_counterparty_upgrade(
        self,
        port_id: PortId,
        chan_id: ChannelId,
        upgrade: Upgrade,
    ) -> Self {
        port_channel_insert(
            &mut self.ibc_store.lock().counterparty_upgrades,
            &port_id,
            &chan_id,
            upgrade,
        );
        self
    }

    /// Produces a new block: the height goes up by one and the clock by one
    /// block time.
    pub fn advance_block(&mut self) {
        self.host_height = self.host_height.increment();
        self.host_timestamp = Timestamp::from_nanoseconds(
            self.host_timestamp
                .nanoseconds()
                .saturating_add(u64::try_from(self.block_time.as_nanos()).unwrap_or(u64::MAX)),
        );
    }

    /// Produces blocks until the host reaches `target_height`.
    pub fn advance_block_up_to_height(mut self, target_height: Height) -> Self {
        while self.host_height < target_height {
            self.advance_block();
        }
        self
    }

    /// Moves the host clock forward without producing blocks.
    pub fn advance_time(&mut self, duration: Duration) {
        self.host_timestamp = Timestamp::from_nanoseconds(
            self.host_timestamp
                .nanoseconds()
                .saturating_add(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)),
        );
    }

    pub fn latest_height(&self) -> Height {
        self.host_height
    }

    pub fn latest_timestamp(&self) -> Timestamp {
        self.host_timestamp
    }

    /// Processes a message with validation and execution, then seals the
    /// block. A failed message leaves the store as it found it.
    pub fn deliver(
        &mut self,
        router: &mut impl Router,
        msg: MsgEnvelope,
    ) -> Result<(), ContextError> {
        let snapshot = self.ibc_store.lock().clone();

        if let Err(e) = dispatch(self, router, msg) {
            *self.ibc_store.lock() = snapshot;
            return Err(e);
        }

        self.advance_block();

        Ok(())
    }

    /// Proves the current content of `path` at the latest height: a
    /// membership proof if a value is stored there, a non-membership proof
    /// otherwise.
    pub fn prove(&self, path: impl Into<Path>) -> CommitmentProofBytes {
        let path = path.into();
        let height = self.host_height;

        let proof = match self.ibc_store.lock().value_at(&path) {
            Some(value) => membership_proof(&self.commitment_prefix, &height, &path, &value),
            None => non_membership_proof(&self.commitment_prefix, &height, &path),
        };

        CommitmentProofBytes::try_from(proof).expect("a digest is never empty")
    }

    pub fn get_events(&self) -> Vec<IbcEvent> {
        self.ibc_store.lock().events.clone()
    }

    pub fn get_logs(&self) -> Vec<String> {
        self.ibc_store.lock().logs.clone()
    }

    pub fn last_event(&self) -> Option<IbcEvent> {
        self.ibc_store.lock().events.last().cloned()
    }

    pub fn packet_receipt(&self, port_id: &PortId, chan_id: &ChannelId, seq: Sequence) -> Receipt {
        port_channel_get(&self.ibc_store.lock().packet_receipt, port_id, chan_id)
            .and_then(|receipts| receipts.get(&seq).cloned())
            .unwrap_or(Receipt::None)
    }
}

fn channel_counter(chan_id: &ChannelId) -> u64 {
    chan_id.counter().map_or(0, |counter| counter + 1)
}
