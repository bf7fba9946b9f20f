//! Implements the channel layer: the channel open and close handshakes,
//! packet relay and the channel upgrade handshake.
//!
//! Every relayer message has a `*_validate` handler, which reads the host
//! store and never writes to it, and a `*_execute` handler, which applies
//! the state changes of a message that already passed validation.
#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(trivial_numeric_casts, unused_import_braces, rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub mod context;
pub mod handler;
pub mod query;
pub mod upgrade;

/// Re-exports data structures and implementations of the channel types crate.
pub mod types {
    #[doc(inline)]
    pub use interlink_core_channel_types::*;
}
