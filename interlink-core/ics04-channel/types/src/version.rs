//! The version field of a channel end. Its content is chosen by the
//! applications; the channel layer only compares versions byte for byte.

use core::fmt::{Display, Error as FmtError, Formatter};

use interlink_primitives::prelude::*;

/// The version field for a `ChannelEnd`.
///
/// This field is opaque to the core layer. Applications may encode
/// arbitrary metadata in it, such as the owner of an account bound to the
/// channel.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    pub fn new(v: String) -> Self {
        Self(v)
    }

    pub fn empty() -> Self {
        Self::new("".to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.0)
    }
}
