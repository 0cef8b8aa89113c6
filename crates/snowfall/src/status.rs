use crate::SnowflakeId;

/// Represents the result of a single non-blocking generation attempt.
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means the generator cannot produce an ID right
///   now, either because the sequence for the current millisecond is
///   exhausted or because another thread won a compare-and-swap race.
///
/// # Example
///
/// ```
/// use snowfall::{IdGenStatus, IdGenerator, LockIdGenerator};
///
/// let generator = LockIdGenerator::new(0, 0).unwrap();
/// let id = loop {
///     match generator.poll_id().unwrap() {
///         IdGenStatus::Ready { id } => break id,
///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
///     }
/// };
/// assert!(id.to_raw() > 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: SnowflakeId,
    },
    /// No ID could be generated on this attempt.
    Pending {
        /// Milliseconds to wait before retrying. Zero means retry
        /// immediately.
        yield_for: u64,
    },
}
