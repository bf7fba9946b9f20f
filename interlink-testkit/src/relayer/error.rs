use displaydoc::Display;
use interlink_core::handler::types::error::ContextError;
use interlink_core::host::types::identifiers::{ChannelId, PortId};

#[derive(Debug, Display)]
pub enum RelayerError {
    /// transaction processing by modules failed error: `{0}`
    TransactionFailed(ContextError),
    /// querying the store of the source chain failed: `{0}`
    QueryFailed(ContextError),
    /// no capability held for channel `{channel_id}` on port `{port_id}`
    CapabilityNotFound { port_id: PortId, channel_id: ChannelId },
    /// expected a `{expected}` event, none was emitted
    MissingEvent { expected: &'static str },
    /// channel `{channel_id}` on port `{port_id}` has no upgrade of the kind `{kind}`
    MissingUpgradeData {
        port_id: PortId,
        channel_id: ChannelId,
        kind: &'static str,
    },
    /// channel `{channel_id}` on port `{port_id}` has no counterparty channel yet
    MissingCounterpartyChannel { port_id: PortId, channel_id: ChannelId },
}

#[cfg(feature = "std")]
impl std::error::Error for RelayerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self {
            Self::TransactionFailed(e) | Self::QueryFailed(e) => Some(e),
            _ => None,
        }
    }
}
