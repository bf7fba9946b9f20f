//! Re-exports data structures and implementations of the interlink channel
//! layer.
#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(trivial_numeric_casts, unused_import_braces, rust_2018_idioms)]

/// Re-exports the handler entrypoints from the `interlink-core-handler`
/// crate for added convenience.
pub mod entrypoint {
    #[doc(inline)]
    pub use interlink_core_handler::entrypoint::*;
}

/// Re-exports primitive types from the `interlink-primitives` crate
pub mod primitives {
    #[doc(inline)]
    pub use interlink_primitives::*;
}

/// Re-exports heights and light-client errors from the
/// `interlink-core-client-types` crate
pub mod client_types {
    #[doc(inline)]
    pub use interlink_core_client_types::*;
}

/// Re-exports connection ends from the `interlink-core-connection-types` crate
pub mod connection_types {
    #[doc(inline)]
    pub use interlink_core_connection_types::*;
}

/// Re-exports the channel layer from the `interlink-core-channel` crate
pub mod channel {
    #[doc(inline)]
    pub use interlink_core_channel::*;
}

/// Re-exports proof and prefix types from the `interlink-core-commitment-types`
/// crate
pub mod commitment_types {
    #[doc(inline)]
    pub use interlink_core_commitment_types::*;
}

/// Re-exports the host traits from the `interlink-core-host` crate
pub mod host {
    #[doc(inline)]
    pub use interlink_core_host::*;
}

/// Re-exports the message envelope and entrypoints from the
/// `interlink-core-handler` crate
pub mod handler {
    #[doc(inline)]
    pub use interlink_core_handler::*;
}

/// Re-exports the module router from the `interlink-core-router` crate
pub mod router {
    #[doc(inline)]
    pub use interlink_core_router::*;
}
