//! Commitment proof and prefix types. Proofs are carried opaquely: their
//! interpretation belongs to the light client behind the host's verifier.
#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(trivial_numeric_casts, unused_import_braces, rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub mod commitment;
pub mod error;
