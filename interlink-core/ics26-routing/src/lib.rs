//! Routing of channel messages to the application module bound to a port.
#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(trivial_numeric_casts, unused_import_braces, rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub mod module;
pub mod router;

/// Re-exports routing data structures from the router types crate.
pub mod types {
    #[doc(inline)]
    pub use interlink_core_router_types::*;
}
