//! Defines the errors a proof verifier and client lookups report.

use displaydoc::Display;
use interlink_core_commitment_types::error::CommitmentError;
use interlink_core_host_types::identifiers::ClientId;
use interlink_primitives::prelude::*;

use crate::height::Height;

/// Encodes all the possible client errors
#[derive(Debug, Display)]
pub enum ClientError {
    /// client `{client_id}` not found
    ClientNotFound { client_id: ClientId },
    /// client `{client_id}` is frozen
    ClientFrozen { client_id: ClientId },
    /// consensus state of client `{client_id}` at height `{height}` not found
    ConsensusStateNotFound { client_id: ClientId, height: Height },
    /// invalid height; cannot be zero or negative
    InvalidHeight,
    /// height cannot end up zero or negative
    InvalidHeightResult,
    /// invalid height string `{height}`
    InvalidHeightString { height: String },
    /// proof height `{proof_height}` is beyond the latest client height `{latest_height}`
    InvalidProofHeight {
        latest_height: Height,
        proof_height: Height,
    },
    /// commitment error: `{0}`
    Commitment(CommitmentError),
    /// failed to verify membership of `{path}`: `{description}`
    FailedMembershipVerification { path: String, description: String },
    /// failed to verify non-membership of `{path}`: `{description}`
    FailedNonMembershipVerification { path: String, description: String },
}

impl From<CommitmentError> for ClientError {
    fn from(e: CommitmentError) -> Self {
        Self::Commitment(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self {
            Self::Commitment(e) => Some(e),
            _ => None,
        }
    }
}
