//! Provides the identifiers, store paths and capability handles a host has to
//! agree on with the channel engine.
#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(trivial_numeric_casts, unused_import_braces, rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub mod capability;
pub mod error;
pub mod identifiers;
pub mod path;
pub mod validate;
