//! A proof verifier standing in for the light clients of a host.
//!
//! Proofs are plain digests: a membership proof is the SHA-256 of the proof
//! height, the store prefix, the path and the value, a non-membership proof
//! leaves the value out and uses a different tag. A [`MockContext`] produces
//! them for its own store, and a [`MockProofVerifier`] on the other chain
//! recomputes them from what the channel engine expects.
//!
//! [`MockContext`]: super::types::MockContext

use alloc::collections::BTreeMap;

use interlink_core::client_types::error::ClientError;
use interlink_core::client_types::Height;
use interlink_core::commitment_types::commitment::{CommitmentPrefix, CommitmentProofBytes};
use interlink_core::host::types::identifiers::ClientId;
use interlink_core::host::types::path::Path;
use interlink_core::host::ProofVerifier;
use interlink_core::primitives::prelude::*;
use interlink_core::primitives::Timestamp;
use sha2::{Digest, Sha256};

const MEMBERSHIP_TAG: u8 = 0x01;
const NON_MEMBERSHIP_TAG: u8 = 0x00;

/// Proof that `value` is stored at `path` under `prefix` at `height`.
pub fn membership_proof(
    prefix: &CommitmentPrefix,
    height: &Height,
    path: &Path,
    value: &[u8],
) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update([MEMBERSHIP_TAG]);
    hash_location(&mut hasher, prefix, height, path);
    hasher.update(value);
    hasher.finalize().to_vec()
}

/// Proof that nothing is stored at `path` under `prefix` at `height`.
pub fn non_membership_proof(prefix: &CommitmentPrefix, height: &Height, path: &Path) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update([NON_MEMBERSHIP_TAG]);
    hash_location(&mut hasher, prefix, height, path);
    hasher.finalize().to_vec()
}

fn hash_location(hasher: &mut Sha256, prefix: &CommitmentPrefix, height: &Height, path: &Path) {
    hasher.update(height.revision_number().to_be_bytes());
    hasher.update(height.revision_height().to_be_bytes());
    hasher.update(prefix.as_bytes());
    hasher.update(path.to_string().as_bytes());
}

/// What a host knows about one counterparty chain.
#[derive(Clone, Debug, Default)]
pub struct MockClientRecord {
    /// Counterparty block times, indexed by the heights the client verified.
    pub consensus_timestamps: BTreeMap<Height, Timestamp>,

    /// A frozen client refuses every proof.
    pub frozen: bool,
}

impl MockClientRecord {
    pub fn latest_height(&self) -> Option<Height> {
        self.consensus_timestamps.keys().next_back().copied()
    }
}

/// Verifies the digests produced by [`membership_proof`] and
/// [`non_membership_proof`] against the clients it tracks.
#[derive(Clone, Debug, Default)]
pub struct MockProofVerifier {
    pub clients: BTreeMap<ClientId, MockClientRecord>,
}

impl MockProofVerifier {
    /// Records a counterparty block, creating the client if needed.
    pub fn update_client(&mut self, client_id: ClientId, height: Height, timestamp: Timestamp) {
        self.clients
            .entry(client_id)
            .or_default()
            .consensus_timestamps
            .insert(height, timestamp);
    }

    pub fn freeze_client(&mut self, client_id: &ClientId) {
        if let Some(record) = self.clients.get_mut(client_id) {
            record.frozen = true;
        }
    }

    fn active_client(&self, client_id: &ClientId) -> Result<&MockClientRecord, ClientError> {
        let record = self
            .clients
            .get(client_id)
            .ok_or_else(|| ClientError::ClientNotFound {
                client_id: client_id.clone(),
            })?;

        if record.frozen {
            return Err(ClientError::ClientFrozen {
                client_id: client_id.clone(),
            });
        }

        Ok(record)
    }

    fn verified_height(&self, client_id: &ClientId, height: &Height) -> Result<(), ClientError> {
        let record = self.active_client(client_id)?;

        if !record.consensus_timestamps.contains_key(height) {
            return Err(ClientError::ConsensusStateNotFound {
                client_id: client_id.clone(),
                height: *height,
            });
        }

        Ok(())
    }
}

impl ProofVerifier for MockProofVerifier {
    fn latest_height(&self, client_id: &ClientId) -> Result<Height, ClientError> {
        self.active_client(client_id)?
            .latest_height()
            .ok_or_else(|| ClientError::ClientNotFound {
                client_id: client_id.clone(),
            })
    }

    fn consensus_timestamp(
        &self,
        client_id: &ClientId,
        height: &Height,
    ) -> Result<Timestamp, ClientError> {
        self.active_client(client_id)?
            .consensus_timestamps
            .get(height)
            .copied()
            .ok_or_else(|| ClientError::ConsensusStateNotFound {
                client_id: client_id.clone(),
                height: *height,
            })
    }

    fn verify_membership(
        &self,
        client_id: &ClientId,
        prefix: &CommitmentPrefix,
        proof: &CommitmentProofBytes,
        proof_height: &Height,
        path: Path,
        value: Vec<u8>,
    ) -> Result<(), ClientError> {
        self.verified_height(client_id, proof_height)?;

        let expected = membership_proof(prefix, proof_height, &path, &value);

        if proof.as_bytes() != expected.as_slice() {
            return Err(ClientError::FailedMembershipVerification {
                path: path.to_string(),
                description: "proof does not match the expected value".to_string(),
            });
        }

        Ok(())
    }

    fn verify_non_membership(
        &self,
        client_id: &ClientId,
        prefix: &CommitmentPrefix,
        proof: &CommitmentProofBytes,
        proof_height: &Height,
        path: Path,
    ) -> Result<(), ClientError> {
        self.verified_height(client_id, proof_height)?;

        let expected = non_membership_proof(prefix, proof_height, &path);

        if proof.as_bytes() != expected.as_slice() {
            return Err(ClientError::FailedNonMembershipVerification {
                path: path.to_string(),
                description: "proof does not attest an absent value".to_string(),
            });
        }

        Ok(())
    }
}
