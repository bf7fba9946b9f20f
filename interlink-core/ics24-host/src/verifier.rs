use interlink_core_client_types::error::ClientError;
use interlink_core_client_types::Height;
use interlink_core_commitment_types::commitment::{CommitmentPrefix, CommitmentProofBytes};
use interlink_core_host_types::identifiers::ClientId;
use interlink_core_host_types::path::Path;
use interlink_primitives::prelude::*;
use interlink_primitives::Timestamp;

/// Checks proofs of the counterparty's committed state.
///
/// Implementations sit on top of the host's light client of the
/// counterparty chain identified by `client_id`. The channel engine only
/// ever hands over the store path and the exact bytes it expects there.
pub trait ProofVerifier {
    /// Returns the latest height the client has verified.
    fn latest_height(&self, client_id: &ClientId) -> Result<Height, ClientError>;

    /// Returns the counterparty's block time recorded by the client at
    /// `height`.
    fn consensus_timestamp(
        &self,
        client_id: &ClientId,
        height: &Height,
    ) -> Result<Timestamp, ClientError>;

    /// Verifies that `value` is stored at `path` in the counterparty's store.
    fn verify_membership(
        &self,
        client_id: &ClientId,
        prefix: &CommitmentPrefix,
        proof: &CommitmentProofBytes,
        proof_height: &Height,
        path: Path,
        value: Vec<u8>,
    ) -> Result<(), ClientError>;

    /// Verifies that nothing is stored at `path` in the counterparty's store.
    fn verify_non_membership(
        &self,
        client_id: &ClientId,
        prefix: &CommitmentPrefix,
        proof: &CommitmentProofBytes,
        proof_height: &Height,
        path: Path,
    ) -> Result<(), ClientError>;

    /// Rejects proofs taken above what the client has verified.
    fn validate_proof_height(
        &self,
        client_id: &ClientId,
        proof_height: &Height,
    ) -> Result<(), ClientError> {
        let latest_height = self.latest_height(client_id)?;

        if latest_height < *proof_height {
            return Err(ClientError::InvalidProofHeight {
                latest_height,
                proof_height: *proof_height,
            });
        }

        Ok(())
    }
}
