use alloc::sync::Arc;
use core::time::Duration;

use interlink_core::client_types::Height;
use interlink_core::commitment_types::commitment::CommitmentPrefix;
use interlink_core::primitives::prelude::*;
use interlink_core::primitives::Timestamp;
use parking_lot::Mutex;
use typed_builder::TypedBuilder;

use crate::testapp::core::types::{MockContext, MockIbcStore, DEFAULT_BLOCK_TIME_SECS};
use crate::testapp::core::verifier::MockProofVerifier;

/// 2023-01-01T00:00:00Z
pub fn year_2023() -> Timestamp {
    Timestamp::from_nanoseconds(1_672_531_200_000_000_000)
}

/// Configuration of the [`MockContext`] type for generating dummy contexts.
#[derive(Debug, TypedBuilder)]
#[builder(build_method(into = MockContext))]
pub struct MockContextConfig {
    #[builder(default = Duration::from_secs(DEFAULT_BLOCK_TIME_SECS))]
    block_time: Duration,

    #[builder(default = Height::new(0, 5).expect("Never fails"))]
    latest_height: Height,

    #[builder(default = year_2023())]
    latest_timestamp: Timestamp,

    #[builder(default = CommitmentPrefix::try_from(b"mock".to_vec()).expect("Never fails"))]
    commitment_prefix: CommitmentPrefix,
}

impl From<MockContextConfig> for MockContext {
    fn from(params: MockContextConfig) -> Self {
        assert_ne!(
            params.latest_height.revision_height(),
            0,
            "The chain must have a non-zero revision_height"
        );

        Self {
            host_height: params.latest_height,
            host_timestamp: params.latest_timestamp,
            block_time: params.block_time,
            commitment_prefix: params.commitment_prefix,
            verifier: MockProofVerifier::default(),
            ibc_store: Arc::new(Mutex::new(MockIbcStore::default())),
        }
    }
}
