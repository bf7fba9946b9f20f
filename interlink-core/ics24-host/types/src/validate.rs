//! Identifier validation following the ICS-24 host requirements: identifiers
//! are made of alphanumerics and `._+-#[]<>`, and must fit a per-kind
//! length window.

use interlink_primitives::prelude::*;

use crate::error::IdentifierError as Error;
use crate::identifiers::{ChannelId, ConnectionId};

const VALID_SPECIAL_CHARS: &str = "._+-#[]<>";

pub fn validate_identifier_chars(id: &str) -> Result<(), Error> {
    if id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || VALID_SPECIAL_CHARS.contains(c))
    {
        Ok(())
    } else {
        Err(Error::InvalidCharacter { id: id.into() })
    }
}

/// Checks the length of `id` against `[min, max]`. A `min` of zero is
/// raised to one so empty identifiers are always rejected.
pub fn validate_identifier_length(id: &str, min: u64, max: u64) -> Result<(), Error> {
    let min = min.max(1);
    let length = u64::try_from(id.len()).unwrap_or(u64::MAX);
    if (min..=max).contains(&length) {
        Ok(())
    } else {
        Err(Error::InvalidLength {
            id: id.into(),
            min,
            max,
        })
    }
}

/// Checks that `id` reads `{name}-{n}` with `n` a `u64` without leading zeros.
pub fn validate_named_u64_index(id: &str, name: &str) -> Result<(), Error> {
    let invalid = || Error::InvalidPrefix {
        id: id.into(),
        prefix: name.into(),
    };

    let counter = id
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('-'))
        .ok_or_else(invalid)?;

    if counter.len() > 1 && counter.starts_with('0') {
        return Err(invalid());
    }

    counter.parse::<u64>().map(|_| ()).map_err(|_| invalid())
}

/// Client identifiers are 9 to 64 characters long.
pub fn validate_client_identifier(id: &str) -> Result<(), Error> {
    validate_identifier_chars(id)?;
    validate_identifier_length(id, 9, 64)
}

/// Connection identifiers are 10 to 64 characters long and read `connection-{n}`.
pub fn validate_connection_identifier(id: &str) -> Result<(), Error> {
    validate_identifier_chars(id)?;
    validate_identifier_length(id, 10, 64)?;
    validate_named_u64_index(id, ConnectionId::prefix())
}

/// Port identifiers are 2 to 128 characters long.
pub fn validate_port_identifier(id: &str) -> Result<(), Error> {
    validate_identifier_chars(id)?;
    validate_identifier_length(id, 2, 128)
}

/// Channel identifiers are 8 to 64 characters long and read `channel-{n}`.
pub fn validate_channel_identifier(id: &str) -> Result<(), Error> {
    validate_identifier_chars(id)?;
    validate_identifier_length(id, 8, 64)?;
    validate_named_u64_index(id, ChannelId::prefix())
}
