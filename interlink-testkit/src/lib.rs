//! Test harness of the interlink channel layer.
//!
//! [`MockContext`](testapp::core::types::MockContext) is an in-memory host
//! that implements the host traits on top of a hash-based proof scheme, so
//! that two contexts can prove their stores to each other. The
//! [`RelayerContext`](relayer::context::RelayerContext) drives both of them
//! through handshakes, packets and upgrades the way an off-chain relayer
//! would.
#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications,
    rust_2018_idioms
)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod fixtures;
pub mod relayer;
pub mod testapp;
