use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Components, Error, Result, SnowflakeId};

/// Total width available to the four fields. The top bit of the `u64` stays
/// clear so every ID is also a non-negative `i64`.
pub const USABLE_BITS: u8 = 63;

/// Bit widths of the four ID fields, and everything derived from them.
///
/// Fields are packed from **MSB to LSB**:
///
/// ```text
///  +--------------+---------------+-----------+------------+--------------+
///  | reserved (1) | timestamp (T) | group (G) | worker (W) | sequence (S) |
///  +--------------+---------------+-----------+------------+--------------+
/// ```
///
/// `T + G + W + S` must equal [`USABLE_BITS`], and every width must be at least
/// one bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "LayoutWidths", into = "LayoutWidths")
)]
pub struct Layout {
    timestamp_bits: u8,
    group_bits: u8,
    worker_bits: u8,
    sequence_bits: u8,
}

impl Default for Layout {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl Layout {
    /// 41 bits of milliseconds, 5 bits of group, 5 bits of worker, 12 bits of
    /// sequence.
    pub const STANDARD: Self = Self {
        timestamp_bits: 41,
        group_bits: 5,
        worker_bits: 5,
        sequence_bits: 12,
    };

    /// Builds a layout from explicit widths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] if any width is zero or the widths do
    /// not add up to [`USABLE_BITS`].
    pub fn new(
        timestamp_bits: u8,
        group_bits: u8,
        worker_bits: u8,
        sequence_bits: u8,
    ) -> Result<Self> {
        if timestamp_bits == 0 || group_bits == 0 || worker_bits == 0 || sequence_bits == 0 {
            return Err(Error::InvalidLayout {
                reason: "every field needs at least one bit",
            });
        }
        let total = u16::from(timestamp_bits)
            + u16::from(group_bits)
            + u16::from(worker_bits)
            + u16::from(sequence_bits);
        if total != u16::from(USABLE_BITS) {
            return Err(Error::InvalidLayout {
                reason: "field widths must add up to 63 bits",
            });
        }
        Ok(Self {
            timestamp_bits,
            group_bits,
            worker_bits,
            sequence_bits,
        })
    }

    pub const fn timestamp_bits(&self) -> u8 {
        self.timestamp_bits
    }

    pub const fn group_bits(&self) -> u8 {
        self.group_bits
    }

    pub const fn worker_bits(&self) -> u8 {
        self.worker_bits
    }

    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    pub const fn sequence_offset(&self) -> u8 {
        0
    }

    pub const fn worker_offset(&self) -> u8 {
        self.sequence_bits
    }

    pub const fn group_offset(&self) -> u8 {
        self.worker_offset() + self.worker_bits
    }

    pub const fn timestamp_offset(&self) -> u8 {
        self.group_offset() + self.group_bits
    }

    /// Largest representable millisecond delta since the epoch.
    pub const fn max_timestamp(&self) -> u64 {
        mask(self.timestamp_bits)
    }

    pub const fn max_group_id(&self) -> u64 {
        mask(self.group_bits)
    }

    pub const fn max_worker_id(&self) -> u64 {
        mask(self.worker_bits)
    }

    pub const fn max_sequence(&self) -> u64 {
        mask(self.sequence_bits)
    }

    /// Largest combined machine id spanning the group and worker fields.
    pub const fn max_machine_id(&self) -> u64 {
        mask(self.group_bits + self.worker_bits)
    }

    /// Returns the last instant (as a [`Duration`] since the Unix epoch) that
    /// this layout can encode when anchored at `epoch`.
    ///
    /// With [`Layout::STANDARD`] and [`DEFAULT_EPOCH`] this is
    /// 2089-09-06T15:47:35.551Z.
    ///
    /// [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH
    pub const fn expiry(&self, epoch: Duration) -> Duration {
        let epoch_ms = epoch.as_millis() as u64;
        Duration::from_millis(epoch_ms + self.max_timestamp())
    }

    /// Packs already validated group and worker ids into their bit positions.
    pub(crate) const fn identity_bits(&self, group_id: u64, worker_id: u64) -> u64 {
        ((group_id & self.max_group_id()) << self.group_offset())
            | ((worker_id & self.max_worker_id()) << self.worker_offset())
    }

    /// Packs a timestamp delta, precomputed identity bits and a sequence.
    pub(crate) const fn pack(&self, timestamp: u64, identity_bits: u64, sequence: u64) -> u64 {
        ((timestamp & self.max_timestamp()) << self.timestamp_offset())
            | identity_bits
            | (sequence & self.max_sequence())
    }

    pub(crate) const fn timestamp_of(&self, raw: u64) -> u64 {
        (raw >> self.timestamp_offset()) & self.max_timestamp()
    }

    pub(crate) const fn sequence_of(&self, raw: u64) -> u64 {
        raw & self.max_sequence()
    }

    /// Builds an ID from its components, masking each to its field width.
    pub const fn compose(&self, components: Components) -> SnowflakeId {
        let identity = self.identity_bits(components.group_id, components.worker_id);
        SnowflakeId::from_raw(self.pack(components.timestamp, identity, components.sequence))
    }

    /// Splits an ID back into its components. Exact inverse of
    /// [`Layout::compose`] for in-range components.
    pub const fn decode(&self, id: SnowflakeId) -> Components {
        let raw = id.to_raw();
        Components {
            timestamp: self.timestamp_of(raw),
            group_id: (raw >> self.group_offset()) & self.max_group_id(),
            worker_id: (raw >> self.worker_offset()) & self.max_worker_id(),
            sequence: self.sequence_of(raw),
        }
    }
}

const fn mask(bits: u8) -> u64 {
    (1 << bits) - 1
}

#[cfg(feature = "serde")]
#[derive(Clone, Copy, Serialize, Deserialize)]
struct LayoutWidths {
    timestamp_bits: u8,
    group_bits: u8,
    worker_bits: u8,
    sequence_bits: u8,
}

#[cfg(feature = "serde")]
impl TryFrom<LayoutWidths> for Layout {
    type Error = Error;

    fn try_from(w: LayoutWidths) -> Result<Self> {
        Self::new(w.timestamp_bits, w.group_bits, w.worker_bits, w.sequence_bits)
    }
}

#[cfg(feature = "serde")]
impl From<Layout> for LayoutWidths {
    fn from(layout: Layout) -> Self {
        Self {
            timestamp_bits: layout.timestamp_bits,
            group_bits: layout.group_bits,
            worker_bits: layout.worker_bits,
            sequence_bits: layout.sequence_bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_EPOCH, TWITTER_EPOCH};

    #[test]
    fn standard_offsets_and_maxima() {
        let layout = Layout::STANDARD;
        assert_eq!(layout.worker_offset(), 12);
        assert_eq!(layout.group_offset(), 17);
        assert_eq!(layout.timestamp_offset(), 22);
        assert_eq!(layout.max_worker_id(), 31);
        assert_eq!(layout.max_group_id(), 31);
        assert_eq!(layout.max_sequence(), 4095);
        assert_eq!(layout.max_machine_id(), 1023);
        assert_eq!(layout.max_timestamp(), (1 << 41) - 1);
    }

    #[test]
    fn rejects_bad_widths() {
        assert!(matches!(
            Layout::new(41, 5, 5, 13),
            Err(Error::InvalidLayout { .. })
        ));
        assert!(matches!(
            Layout::new(46, 0, 5, 12),
            Err(Error::InvalidLayout { .. })
        ));
        assert_eq!(Layout::new(41, 5, 5, 12), Ok(Layout::STANDARD));
        assert!(Layout::new(42, 4, 6, 11).is_ok());
    }

    #[test]
    fn decode_known_value() {
        let layout = Layout::STANDARD;
        let raw = (1_000 << 22) | (7 << 17) | (9 << 12) | 42;
        let parts = layout.decode(SnowflakeId::from_raw(raw));
        assert_eq!(
            parts,
            Components {
                timestamp: 1_000,
                group_id: 7,
                worker_id: 9,
                sequence: 42,
            }
        );
        assert_eq!(layout.compose(parts).to_raw(), raw);
    }

    #[test]
    fn top_bit_never_set() {
        let layout = Layout::STANDARD;
        let id = layout.compose(Components {
            timestamp: layout.max_timestamp(),
            group_id: layout.max_group_id(),
            worker_id: layout.max_worker_id(),
            sequence: layout.max_sequence(),
        });
        assert_eq!(id.to_raw(), u64::MAX >> 1);
        assert_eq!(id.to_i64(), i64::MAX);
    }

    #[test]
    fn expiry_dates() {
        let layout = Layout::STANDARD;
        // 2089-09-06T15:47:35.551Z
        assert_eq!(
            layout.expiry(DEFAULT_EPOCH),
            Duration::from_millis(3_776_860_055_551)
        );
        // 2080-07-10T17:30:30.208Z
        assert_eq!(
            layout.expiry(TWITTER_EPOCH),
            Duration::from_millis(3_487_858_230_208)
        );
    }
}
