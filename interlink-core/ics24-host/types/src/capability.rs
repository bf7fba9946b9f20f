//! Capability handles bind a channel end to the module allowed to act on it.

use derive_more::Display;

/// An opaque handle minted by the host when a capability path is claimed.
///
/// The channel engine never creates capabilities itself. It asks the host to
/// claim a path when a channel is created, and to authenticate a handle
/// against a path whenever a module acts on the channel.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "capability#{index}")]
pub struct Capability {
    index: u64,
}

impl Capability {
    pub fn new(index: u64) -> Self {
        Self { index }
    }

    pub fn index(&self) -> u64 {
        self.index
    }
}
