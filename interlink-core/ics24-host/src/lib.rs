//! Provides the host traits the channel engine runs against.
//!
//! A host implements [`ValidationContext`] for read access during message
//! validation and [`ExecutionContext`] for the writes of message execution.
//! Proof checking is delegated to a [`ProofVerifier`], which bridges to the
//! host's light clients of its counterparties.
#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(trivial_numeric_casts, unused_import_braces, rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub(crate) mod context;
pub(crate) mod verifier;

pub use context::*;
pub use verifier::*;

/// Re-exports data structures of the host types crate.
pub mod types {
    #[doc(inline)]
    pub use interlink_core_host_types::*;
}
