//! Defines the channel, packet and upgrade error types
use displaydoc::Display;
use interlink_core_client_types::error::ClientError;
use interlink_core_client_types::Height;
use interlink_core_host_types::error::IdentifierError;
use interlink_core_host_types::identifiers::{ChannelId, ConnectionId, PortId, Sequence};
use interlink_primitives::prelude::*;
use interlink_primitives::Timestamp;

use super::channel::Counterparty;
use super::timeout::{TimeoutHeight, TimeoutTimestamp};
use crate::upgrade::UpgradeTimeout;

#[derive(Debug, Display)]
pub enum ChannelError {
    /// application module error: `{description}`
    AppModule { description: String },
    /// identifier error: `{0}`
    InvalidIdentifier(IdentifierError),
    /// invalid channel state: expected `{expected}`, actual `{actual}`
    InvalidState { expected: String, actual: String },
    /// invalid channel order type: expected `{expected}`, actual `{actual}`
    InvalidOrderType { expected: String, actual: String },
    /// invalid connection hops length: expected `{expected}`, actual `{actual}`
    InvalidConnectionHopsLength { expected: u64, actual: u64 },
    /// invalid counterparty: expected `{expected}`, actual `{actual}`
    InvalidCounterparty {
        expected: Counterparty,
        actual: Counterparty,
    },
    /// missing counterparty
    MissingCounterparty,
    /// channel end (`{port_id}`, `{channel_id}`) does not exist
    ChannelNotFound {
        port_id: PortId,
        channel_id: ChannelId,
    },
    /// channel end (`{port_id}`, `{channel_id}`) already exists
    ChannelExists {
        port_id: PortId,
        channel_id: ChannelId,
    },
    /// channel `{channel_id}` on port `{port_id}` is still active for connection `{connection_id}`
    ActiveChannelExists {
        port_id: PortId,
        channel_id: ChannelId,
        connection_id: ConnectionId,
    },
    /// failed to verify the counterparty channel end: `{0}`
    VerifyChannelFailed(ClientError),
}

#[derive(Debug, Display)]
pub enum PacketError {
    /// application module error: `{description}`
    AppModule { description: String },
    /// channel error: `{0}`
    Channel(ChannelError),
    /// mismatched packet sequences: expected `{expected}`, actual `{actual}`
    PacketSequenceMismatch {
        expected: Sequence,
        actual: Sequence,
    },
    /// packet commitment for sequence `{sequence}` not found
    PacketCommitmentNotFound { sequence: Sequence },
    /// commitment for packet `{sequence}` does not match the packet
    IncorrectPacketCommitment { sequence: Sequence },
    /// packet `{sequence}` timed out: chain height `{chain_height}`, chain timestamp `{chain_timestamp}`
    PacketTimeoutElapsed {
        sequence: Sequence,
        chain_height: Height,
        chain_timestamp: Timestamp,
    },
    /// packet timeout height `{timeout_height}` > chain height `{chain_height}` and timeout timestamp `{timeout_timestamp}` > chain timestamp `{chain_timestamp}`
    PacketTimeoutNotReached {
        timeout_height: TimeoutHeight,
        chain_height: Height,
        timeout_timestamp: TimeoutTimestamp,
        chain_timestamp: Timestamp,
    },
    /// packet `{sequence}` was sent after the counterparty stopped sending at `{next_sequence_send}`
    PacketSentAfterUpgrade {
        sequence: Sequence,
        next_sequence_send: Sequence,
    },
    /// packet `{sequence}` has already been relayed past the counterparty's next receive sequence `{next_seq_recv}`
    PacketAlreadyReceived {
        sequence: Sequence,
        next_seq_recv: Sequence,
    },
    /// failed packet verification for packet with sequence `{sequence}`: `{client_error}`
    PacketVerificationFailed {
        sequence: Sequence,
        client_error: ClientError,
    },
    /// missing timeout
    MissingTimeout,
    /// invalid timeout height: `{0}`
    InvalidTimeoutHeight(ClientError),
    /// invalid identifier: `{0}`
    InvalidIdentifier(IdentifierError),
    /// empty acknowledgement not allowed
    EmptyAcknowledgement,
    /// empty acknowledgement status not allowed
    EmptyAcknowledgementStatus,
    /// packet sequence cannot be 0
    ZeroPacketSequence,
}

#[derive(Debug, Display)]
pub enum UpgradeError {
    /// channel error: `{0}`
    Channel(ChannelError),
    /// proposed upgrade fields are identical to the current channel fields
    UpgradeFieldsUnchanged,
    /// invalid upgrade fields: `{description}`
    InvalidUpgradeFields { description: String },
    /// missing upgrade fields
    MissingUpgradeFields,
    /// upgrade timeout must set a height or a timestamp
    InvalidUpgradeTimeout,
    /// no upgrade in progress for channel (`{port_id}`, `{channel_id}`)
    UpgradeNotFound {
        port_id: PortId,
        channel_id: ChannelId,
    },
    /// no counterparty upgrade recorded for channel (`{port_id}`, `{channel_id}`)
    CounterpartyUpgradeNotFound {
        port_id: PortId,
        channel_id: ChannelId,
    },
    /// upgrade sequence mismatch: expected `{expected}`, actual `{actual}`
    UpgradeSequenceMismatch { expected: u64, actual: u64 },
    /// local upgrade at sequence `{local_sequence}` takes precedence over the counterparty upgrade at sequence `{counterparty_sequence}`
    UpgradeSequenceLost {
        local_sequence: u64,
        counterparty_sequence: u64,
    },
    /// both ends proposed the same upgrade at sequence `{sequence}` from identical channel ids
    IndistinguishableCrossingUpgrades { sequence: u64 },
    /// counterparty upgrade at sequence `{counterparty_sequence}` is not newer than the local sequence `{local_sequence}`
    OutdatedCounterpartyUpgrade {
        local_sequence: u64,
        counterparty_sequence: u64,
    },
    /// incompatible counterparty upgrade: `{description}`
    IncompatibleCounterpartyUpgrade { description: String },
    /// upgrade timeout `{timeout}` elapsed at height `{height}` and timestamp `{timestamp}`
    UpgradeTimeoutElapsed {
        timeout: UpgradeTimeout,
        height: Height,
        timestamp: Timestamp,
    },
    /// upgrade timeout `{timeout}` not reached by counterparty height `{height}` and timestamp `{timestamp}`
    UpgradeTimeoutNotReached {
        timeout: UpgradeTimeout,
        height: Height,
        timestamp: Timestamp,
    },
    /// counterparty has already committed the upgrade: `{description}`
    CounterpartyUpgradeCommitted { description: String },
    /// error receipt sequence `{receipt_sequence}` is lower than the upgrade sequence `{upgrade_sequence}`
    InvalidErrorReceiptSequence {
        receipt_sequence: u64,
        upgrade_sequence: u64,
    },
    /// channel closed while the upgrade was in progress
    ChannelClosedDuringUpgrade,
    /// upgrade cancelled by the counterparty at sequence `{sequence}`
    UpgradeCancelled { sequence: u64 },
    /// failed to verify the counterparty upgrade: `{0}`
    VerifyUpgradeFailed(ClientError),
    /// application rejected the upgrade: `{description}`
    AppModule { description: String },
}

impl From<IdentifierError> for ChannelError {
    fn from(err: IdentifierError) -> Self {
        Self::InvalidIdentifier(err)
    }
}

impl From<ChannelError> for PacketError {
    fn from(err: ChannelError) -> Self {
        Self::Channel(err)
    }
}

impl From<IdentifierError> for PacketError {
    fn from(err: IdentifierError) -> Self {
        Self::InvalidIdentifier(err)
    }
}

impl From<ChannelError> for UpgradeError {
    fn from(err: ChannelError) -> Self {
        Self::Channel(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PacketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self {
            Self::Channel(e) => Some(e),
            Self::InvalidIdentifier(e) => Some(e),
            Self::InvalidTimeoutHeight(e) => Some(e),
            Self::PacketVerificationFailed {
                client_error: e, ..
            } => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ChannelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self {
            Self::InvalidIdentifier(e) => Some(e),
            Self::VerifyChannelFailed(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UpgradeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self {
            Self::Channel(e) => Some(e),
            Self::VerifyUpgradeFailed(e) => Some(e),
            _ => None,
        }
    }
}
