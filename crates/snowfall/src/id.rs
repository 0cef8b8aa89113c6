use core::{fmt, time::Duration};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A generated 64-bit identifier.
///
/// The reserved top bit is always clear, so the value converts losslessly to
/// a non-negative `i64`. Ordering follows the raw integer, which puts the
/// timestamp first, then group, worker and sequence.
///
/// The layout is not carried by the ID itself; use [`Layout::decode`] to
/// split it into [`Components`].
///
/// [`Layout::decode`]: crate::Layout::decode
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
#[repr(transparent)]
pub struct SnowflakeId(u64);

impl SnowflakeId {
    /// Wraps a raw integer.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer.
    pub const fn to_raw(&self) -> u64 {
        self.0
    }

    /// Returns the value as a signed integer, for stores that only speak
    /// `BIGINT`.
    pub const fn to_i64(&self) -> i64 {
        (self.0 & (u64::MAX >> 1)) as i64
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnowflakeId({})", self.0)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl From<SnowflakeId> for i64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_i64()
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

/// The four fields of a decoded [`SnowflakeId`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Components {
    /// Milliseconds since the epoch the ID was generated against.
    pub timestamp: u64,
    pub group_id: u64,
    pub worker_id: u64,
    pub sequence: u64,
}

impl Components {
    /// Converts the relative timestamp back into a [`Duration`] since the
    /// Unix epoch.
    pub const fn unix_time(&self, epoch: Duration) -> Duration {
        Duration::from_millis(epoch.as_millis() as u64 + self.timestamp)
    }
}
