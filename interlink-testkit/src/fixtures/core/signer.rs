use interlink_core::primitives::prelude::*;
use interlink_core::primitives::Signer;

/// Returns a dummy bech32 account address, for testing purposes only!
pub fn dummy_bech32_account() -> String {
    "cosmos1wxeyh7zgn4tctjzs0vtqpc6p5cxq5t2muzl7ng".to_string()
}

/// Returns a dummy account signer, for testing purposes only!
pub fn dummy_account_id() -> Signer {
    Signer::from(dummy_bech32_account())
}
