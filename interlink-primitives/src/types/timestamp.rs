//! Defines the representation of host timestamps.

use core::fmt::{Display, Error as FmtError, Formatter};
use core::num::ParseIntError;
use core::ops::Add;
use core::str::FromStr;
use core::time::Duration;

use displaydoc::Display;
use time::OffsetDateTime;

/// A point in time, counted in nanoseconds since the Unix epoch.
///
/// Timestamps are what hosts report as their block time and what packets and
/// upgrades carry as timeouts. The `u64` range reaches roughly year 2554.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, Eq, Copy, Clone, Debug, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    nanos: u64,
}

impl Timestamp {
    pub const fn from_nanoseconds(nanoseconds: u64) -> Self {
        Self { nanos: nanoseconds }
    }

    pub fn from_unix_timestamp(secs: u64, nanos: u32) -> Result<Self, TimestampError> {
        if nanos > 999_999_999 {
            return Err(TimestampError::DateOutOfRange);
        }
        secs.checked_mul(1_000_000_000)
            .and_then(|n| n.checked_add(u64::from(nanos)))
            .map(Self::from_nanoseconds)
            .ok_or(TimestampError::TimestampOverflow)
    }

    /// Returns a `Timestamp` representation of the current time.
    #[cfg(feature = "std")]
    pub fn now() -> Self {
        let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
        Self::from_nanoseconds(u64::try_from(nanos).unwrap_or_default())
    }

    pub fn nanoseconds(self) -> u64 {
        self.nanos
    }

    /// Computes the duration elapsed from `other` until `self`, or `None`
    /// when `other` is later.
    pub fn duration_since(&self, other: &Self) -> Option<Duration> {
        self.nanos
            .checked_sub(other.nanos)
            .map(Duration::from_nanos)
    }
}

impl From<Timestamp> for u64 {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.nanos
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_nanoseconds(u64::from_str(s)?))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.nanos)) {
            Ok(time) => write!(f, "Timestamp({time})"),
            Err(_) => write!(f, "Timestamp({}ns)", self.nanos),
        }
    }
}

impl Add<Duration> for Timestamp {
    type Output = Result<Self, TimestampError>;

    fn add(self, rhs: Duration) -> Self::Output {
        let rhs = u64::try_from(rhs.as_nanos()).map_err(|_| TimestampError::TimestampOverflow)?;
        self.nanos
            .checked_add(rhs)
            .map(Self::from_nanoseconds)
            .ok_or(TimestampError::TimestampOverflow)
    }
}

#[derive(Debug, Display, derive_more::From)]
pub enum TimestampError {
    /// parsing u64 integer from string error: `{0}`
    ParseInt(ParseIntError),
    /// date out of range
    DateOutOfRange,
    /// timestamp overflow when modifying with duration
    TimestampOverflow,
}

#[cfg(feature = "std")]
impl std::error::Error for TimestampError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self {
            Self::ParseInt(e) => Some(e),
            _ => None,
        }
    }
}
