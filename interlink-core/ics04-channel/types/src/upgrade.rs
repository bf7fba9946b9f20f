//! Records kept while a channel renegotiates its parameters.
//!
//! An upgrade is stored next to the channel end rather than inside it: the
//! channel keeps its current fields (and keeps relaying packets under them)
//! until both ends have flushed, at which point the upgrade fields are
//! committed onto the channel.

use core::fmt::{Display, Error as FmtError, Formatter};
use core::str::FromStr;

use ibc_proto::ibc::core::channel::v1::{
    ErrorReceipt as RawErrorReceipt, Timeout as RawTimeout, Upgrade as RawUpgrade,
    UpgradeFields as RawUpgradeFields,
};
use ibc_proto::Protobuf;
use interlink_core_client_types::Height;
use interlink_core_host_types::identifiers::{ConnectionId, Sequence};
use interlink_primitives::prelude::*;
use interlink_primitives::utils::PrettySlice;
use interlink_primitives::Timestamp;

use crate::channel::{verify_connection_hops_length, ChannelEnd, Order};
use crate::error::UpgradeError;
use crate::timeout::{TimeoutHeight, TimeoutTimestamp};
use crate::Version;

/// The channel parameters an upgrade may change.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpgradeFields {
    pub ordering: Order,
    pub connection_hops: Vec<ConnectionId>,
    pub version: Version,
}

impl UpgradeFields {
    pub fn new(ordering: Order, connection_hops: Vec<ConnectionId>, version: Version) -> Self {
        Self {
            ordering,
            connection_hops,
            version,
        }
    }

    pub fn validate_basic(&self) -> Result<(), UpgradeError> {
        if self.ordering == Order::None {
            return Err(UpgradeError::InvalidUpgradeFields {
                description: "ordering cannot be None".to_string(),
            });
        }

        verify_connection_hops_length(&self.connection_hops, 1).map_err(|e| {
            UpgradeError::InvalidUpgradeFields {
                description: e.to_string(),
            }
        })?;

        if self.version.is_empty() {
            return Err(UpgradeError::InvalidUpgradeFields {
                description: "version cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

impl From<&ChannelEnd> for UpgradeFields {
    fn from(channel_end: &ChannelEnd) -> Self {
        Self::new(
            channel_end.ordering,
            channel_end.connection_hops.clone(),
            channel_end.version.clone(),
        )
    }
}

impl Display for UpgradeFields {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "UpgradeFields {{ ordering: {}, connection_hops: {}, version: {} }}",
            self.ordering,
            PrettySlice(&self.connection_hops),
            self.version
        )
    }
}

impl Protobuf<RawUpgradeFields> for UpgradeFields {}

impl TryFrom<RawUpgradeFields> for UpgradeFields {
    type Error = UpgradeError;

    fn try_from(value: RawUpgradeFields) -> Result<Self, Self::Error> {
        let ordering = Order::from_i32(value.ordering)?;

        let connection_hops = value
            .connection_hops
            .iter()
            .map(|conn_id| ConnectionId::from_str(conn_id))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| UpgradeError::InvalidUpgradeFields {
                description: e.to_string(),
            })?;

        Ok(Self::new(ordering, connection_hops, value.version.into()))
    }
}

impl From<UpgradeFields> for RawUpgradeFields {
    fn from(value: UpgradeFields) -> Self {
        RawUpgradeFields {
            ordering: value.ordering as i32,
            connection_hops: value
                .connection_hops
                .iter()
                .map(|v| v.as_str().to_string())
                .collect(),
            version: value.version.to_string(),
        }
    }
}

/// Deadline for an upgrade to complete flushing.
///
/// The deadline is applied to the clock of the chain evaluating it: a chain
/// whose own height or time has passed it aborts instead of completing, and
/// a chain may time its counterparty out by proving the counterparty has
/// passed it without finishing.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradeTimeout {
    pub height: TimeoutHeight,
    pub timestamp: TimeoutTimestamp,
}

impl UpgradeTimeout {
    pub fn new(height: TimeoutHeight, timestamp: TimeoutTimestamp) -> Result<Self, UpgradeError> {
        if !height.is_set() && !timestamp.is_set() {
            return Err(UpgradeError::InvalidUpgradeTimeout);
        }

        Ok(Self { height, timestamp })
    }

    pub fn at_height(height: Height) -> Self {
        Self {
            height: TimeoutHeight::At(height),
            timestamp: TimeoutTimestamp::Never,
        }
    }

    pub fn at_timestamp(timestamp: Timestamp) -> Self {
        Self {
            height: TimeoutHeight::Never,
            timestamp: TimeoutTimestamp::from(timestamp),
        }
    }

    pub fn is_set(&self) -> bool {
        self.height.is_set() || self.timestamp.is_set()
    }

    /// Returns `true` once either bound has been reached.
    pub fn has_elapsed(&self, height: Height, timestamp: &Timestamp) -> bool {
        self.height.has_expired(height) || self.timestamp.has_expired(timestamp)
    }
}

impl Display for UpgradeTimeout {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "UpgradeTimeout {{ height: {}, timestamp: {} }}",
            self.height, self.timestamp
        )
    }
}

impl Protobuf<RawTimeout> for UpgradeTimeout {}

impl TryFrom<RawTimeout> for UpgradeTimeout {
    type Error = UpgradeError;

    fn try_from(value: RawTimeout) -> Result<Self, Self::Error> {
        let height = match value.height {
            Some(raw_height) => TimeoutHeight::try_from(raw_height).map_err(|e| {
                UpgradeError::InvalidUpgradeFields {
                    description: e.to_string(),
                }
            })?,
            None => TimeoutHeight::Never,
        };

        Self::new(height, TimeoutTimestamp::from(value.timestamp))
    }
}

impl From<UpgradeTimeout> for RawTimeout {
    fn from(value: UpgradeTimeout) -> Self {
        RawTimeout {
            height: Some(value.height.into()),
            timestamp: value.timestamp.nanoseconds(),
        }
    }
}

/// A proposed upgrade of a channel end.
///
/// `next_sequence_send` is zero while the upgrade is only proposed. It is
/// frozen to the channel's next send sequence when the end stops sending and
/// starts flushing, so the counterparty knows which packets it still has to
/// expect.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upgrade {
    pub fields: UpgradeFields,
    pub timeout: UpgradeTimeout,
    pub next_sequence_send: Sequence,
}

impl Upgrade {
    pub fn new(fields: UpgradeFields, timeout: UpgradeTimeout, next_sequence_send: Sequence) -> Self {
        Self {
            fields,
            timeout,
            next_sequence_send,
        }
    }
}

impl Protobuf<RawUpgrade> for Upgrade {}

impl TryFrom<RawUpgrade> for Upgrade {
    type Error = UpgradeError;

    fn try_from(value: RawUpgrade) -> Result<Self, Self::Error> {
        let fields = value
            .fields
            .ok_or(UpgradeError::MissingUpgradeFields)?
            .try_into()?;

        let timeout = value
            .timeout
            .ok_or(UpgradeError::InvalidUpgradeTimeout)?
            .try_into()?;

        Ok(Self::new(fields, timeout, value.next_sequence_send.into()))
    }
}

impl From<Upgrade> for RawUpgrade {
    fn from(value: Upgrade) -> Self {
        RawUpgrade {
            fields: Some(value.fields.into()),
            timeout: Some(value.timeout.into()),
            next_sequence_send: value.next_sequence_send.value(),
        }
    }
}

/// Written by a chain that aborted an upgrade attempt, so that the
/// counterparty can prove the abort and cancel on its side.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorReceipt {
    pub sequence: u64,
    pub message: String,
}

impl ErrorReceipt {
    pub fn new(sequence: u64, message: impl ToString) -> Self {
        Self {
            sequence,
            message: message.to_string(),
        }
    }
}

impl Protobuf<RawErrorReceipt> for ErrorReceipt {}

impl TryFrom<RawErrorReceipt> for ErrorReceipt {
    type Error = UpgradeError;

    fn try_from(value: RawErrorReceipt) -> Result<Self, Self::Error> {
        Ok(Self::new(value.sequence, value.message))
    }
}

impl From<ErrorReceipt> for RawErrorReceipt {
    fn from(value: ErrorReceipt) -> Self {
        RawErrorReceipt {
            sequence: value.sequence,
            message: value.message,
        }
    }
}

impl ChannelEnd {
    /// The (ordering, connection hops, version) triple currently in force.
    pub fn upgrade_fields(&self) -> UpgradeFields {
        UpgradeFields::from(self)
    }

    /// Commits upgraded parameters onto the channel end.
    pub fn apply_upgrade_fields(&mut self, fields: UpgradeFields) {
        self.ordering = fields.ordering;
        self.connection_hops = fields.connection_hops;
        self.version = fields.version;
    }
}
