use displaydoc::Display;
use interlink_core_host_types::identifiers::ConnectionId;
use interlink_primitives::prelude::*;

#[derive(Debug, Display)]
pub enum ConnectionError {
    /// connection `{connection_id}` not found
    ConnectionNotFound { connection_id: ConnectionId },
    /// invalid connection state: expected `{expected}`, actual `{actual}`
    InvalidState { expected: String, actual: String },
    /// missing counterparty connection identifier
    MissingCounterpartyConnectionId,
}

#[cfg(feature = "std")]
impl std::error::Error for ConnectionError {}
