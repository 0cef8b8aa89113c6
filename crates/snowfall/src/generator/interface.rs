use core::time::Duration;

use crate::{Components, IdGenStatus, Identity, Layout, Result, SnowflakeId};

/// A minimal interface for generating IDs.
pub trait IdGenerator {
    /// The bit layout every ID from this generator follows.
    fn layout(&self) -> &Layout;

    /// The zero point of the timestamp field.
    fn epoch(&self) -> Duration;

    /// The group and worker id baked into every ID.
    fn identity(&self) -> Identity;

    /// Attempts to generate the next ID without blocking.
    ///
    /// The returned [`IdGenStatus`] contains either:
    /// - the newly generated ID, or
    /// - a duration to yield for if the sequence for the current millisecond
    ///   is exhausted.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   issued timestamp. The generator stays usable.
    /// - [`Error::ClockBeforeEpoch`] or [`Error::TimestampOverflow`] if the
    ///   clock is outside the range the layout can encode.
    /// - [`Error::LockPoisoned`] for a poisoned lock.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    /// [`Error::ClockBeforeEpoch`]: crate::Error::ClockBeforeEpoch
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    fn poll_id(&self) -> Result<IdGenStatus>;

    /// Generates the next ID, calling `f` with the suggested wait (in
    /// milliseconds) each time the generator is pending.
    ///
    /// # Errors
    ///
    /// Any error from [`IdGenerator::poll_id`]. Errors are returned
    /// immediately, never retried.
    fn next_id_with(&self, mut f: impl FnMut(u64)) -> Result<SnowflakeId> {
        loop {
            match self.poll_id()? {
                IdGenStatus::Ready { id } => break Ok(id),
                IdGenStatus::Pending { yield_for } => f(yield_for),
            }
        }
    }

    /// Generates the next ID, spinning on the clock and yielding the thread
    /// while the current millisecond's sequence is exhausted.
    ///
    /// The spin only lasts until the clock ticks over, so it is bounded by
    /// about a millisecond unless the clock itself stalls.
    ///
    /// # Errors
    ///
    /// Any error from [`IdGenerator::poll_id`].
    fn next_id(&self) -> Result<SnowflakeId> {
        self.next_id_with(|_| std::thread::yield_now())
    }

    /// Splits an ID produced by this generator into its fields.
    fn decode(&self, id: SnowflakeId) -> Components {
        self.layout().decode(id)
    }
}
