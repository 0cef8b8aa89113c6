use core::{cmp::Ordering, time::Duration};

use crate::{Config, Error, Identity, Layout, RandSource, Reseed, Result, TimeSource};

/// Top bit of the state word while no ID has been issued.
const UNISSUED: u64 = 1 << 63;

/// The immutable half of a generator plus the state transition every
/// generator flavour shares.
///
/// Generator state is a single packed `u64`: the last issued ID. Its
/// timestamp field is the last observed delta and its sequence field the
/// last issued sequence, so the whole read-modify-write fits one word. The
/// reserved top bit, never set in an issued ID, marks a generator that has
/// not issued anything yet.
pub(crate) struct Sequencer<T, R> {
    layout: Layout,
    epoch_ms: u64,
    identity: Identity,
    identity_bits: u64,
    reseed: Reseed,
    time: T,
    rand: R,
}

impl<T, R> Sequencer<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    pub(crate) fn new(config: &Config, identity: Identity, time: T, rand: R) -> Result<Self> {
        config.validate()?;
        // Identities built against a narrower layout would be masked off.
        Identity::new(
            &config.layout,
            identity.worker_id() as i64,
            identity.group_id() as i64,
        )?;
        Ok(Self {
            layout: config.layout,
            epoch_ms: config.epoch_millis(),
            identity_bits: identity.bits(&config.layout),
            identity,
            reseed: config.reseed,
            time,
            rand,
        })
    }

    /// State before any ID has been issued.
    pub(crate) const fn initial_state(&self) -> u64 {
        UNISSUED | self.identity_bits
    }

    pub(crate) const fn layout(&self) -> &Layout {
        &self.layout
    }

    pub(crate) const fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch_ms)
    }

    pub(crate) const fn identity(&self) -> Identity {
        self.identity
    }

    /// Reads the clock and converts it to a delta since the epoch.
    pub(crate) fn now(&self) -> Result<u64> {
        let now_ms = self.time.current_millis();
        let Some(delta) = now_ms.checked_sub(self.epoch_ms) else {
            return Err(Error::ClockBeforeEpoch {
                now_ms,
                epoch_ms: self.epoch_ms,
            });
        };
        if delta > self.layout.max_timestamp() {
            return Err(Error::TimestampOverflow {
                delta_ms: delta,
                max_ms: self.layout.max_timestamp(),
            });
        }
        Ok(delta)
    }

    /// Computes the state following `current` at time `now`.
    ///
    /// Returns `Ok(None)` when the sequence for `now` is exhausted and the
    /// caller must wait for the next millisecond.
    #[inline]
    pub(crate) fn advance(&self, current: u64, now: u64) -> Result<Option<u64>> {
        if current & UNISSUED != 0 {
            let sequence = self.reseed.next(&self.rand);
            return Ok(Some(self.layout.pack(now, self.identity_bits, sequence)));
        }

        let current_ts = self.layout.timestamp_of(current);
        let exhausted = self.layout.sequence_of(current) == self.layout.max_sequence();
        match now.cmp(&current_ts) {
            Ordering::Equal if exhausted => Ok(None),
            Ordering::Equal => Ok(Some(current + 1)),
            Ordering::Greater => {
                // After an exhausted tick the sequence has wrapped to zero.
                let sequence = if exhausted {
                    0
                } else {
                    self.reseed.next(&self.rand)
                };
                Ok(Some(self.layout.pack(now, self.identity_bits, sequence)))
            }
            Ordering::Less => Err(Self::cold_clock_behind(now, current_ts)),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, current_ts: u64) -> Error {
        let behind_by_ms = current_ts - now;
        #[cfg(feature = "tracing")]
        tracing::error!(
            behind_by_ms,
            "clock moved backwards, refusing to generate id"
        );
        Error::ClockRegression { behind_by_ms }
    }
}
