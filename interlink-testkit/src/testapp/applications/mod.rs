//! Sample applications bound to the mock router.

pub mod account_host;
pub mod dummy;
