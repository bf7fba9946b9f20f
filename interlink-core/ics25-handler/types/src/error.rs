//! Defines the context error type

use derive_more::From;
use displaydoc::Display;
use interlink_core_channel_types::error::{ChannelError, PacketError, UpgradeError};
use interlink_core_client_types::error::ClientError;
use interlink_core_connection_types::error::ConnectionError;
use interlink_core_host_types::error::HostError;
use interlink_core_router_types::error::RouterError;
use interlink_primitives::prelude::*;

/// Top-level error
#[derive(Debug, Display, From)]
pub enum ContextError {
    /// client error: {0}
    ClientError(ClientError),
    /// connection error: {0}
    ConnectionError(ConnectionError),
    /// channel error: {0}
    ChannelError(ChannelError),
    /// packet error: {0}
    PacketError(PacketError),
    /// channel upgrade error: {0}
    UpgradeError(UpgradeError),
    /// routing error: {0}
    RouterError(RouterError),
    /// host error: {0}
    HostError(HostError),
}

impl ContextError {
    /// Whether the error was raised while checking a proof against the
    /// counterparty's committed state.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::ChannelError(ChannelError::VerifyChannelFailed(_))
                | Self::PacketError(PacketError::PacketVerificationFailed { .. })
                | Self::UpgradeError(UpgradeError::VerifyUpgradeFailed(_))
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self {
            Self::ClientError(e) => Some(e),
            Self::ConnectionError(e) => Some(e),
            Self::ChannelError(e) => Some(e),
            Self::PacketError(e) => Some(e),
            Self::UpgradeError(e) => Some(e),
            Self::RouterError(e) => Some(e),
            Self::HostError(e) => Some(e),
        }
    }
}
