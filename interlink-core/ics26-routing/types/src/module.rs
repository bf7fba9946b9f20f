//! Names the router gives to application modules, and what modules hand back
//! from their callbacks.

use alloc::borrow::Borrow;

use derive_more::Display;
use interlink_primitives::prelude::*;

use crate::event::ModuleEvent;

/// Router-local name of an application module.
///
/// Other chains only ever see the [`PortId`] a module is bound to, never this
/// name.
///
/// [`PortId`]: interlink_core_host_types::identifiers::PortId
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(s: String) -> Self {
        Self(s)
    }
}

// Lets routers look modules up by `&str`.
impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Events and log lines a module callback wants the host to emit alongside
/// the core event of the message.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleExtras {
    pub events: Vec<ModuleEvent>,
    pub log: Vec<String>,
}

impl ModuleExtras {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_event(mut self, event: ModuleEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_log(mut self, message: impl ToString) -> Self {
        self.log.push(message.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.log.is_empty()
    }
}
