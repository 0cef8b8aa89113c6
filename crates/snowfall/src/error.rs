use core::fmt;

/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The identity field rejected by [`Error::InvalidIdentity`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdentityField {
    Group,
    Worker,
    Machine,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Group => "group id",
            Self::Worker => "worker id",
            Self::Machine => "machine id",
        })
    }
}

/// All error variants that `snowfall` can emit.
///
/// Sequence exhaustion is deliberately absent: running out of sequence space
/// inside one millisecond is backpressure, handled by waiting for the clock.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A group or worker id lies outside `0..=max` for the configured layout.
    #[error("{field} must be within 0..={max}, got {value}")]
    InvalidIdentity {
        field: IdentityField,
        value: i64,
        max: u64,
    },

    /// The bit widths or reseed policy do not describe a usable layout.
    #[error("invalid layout: {reason}")]
    InvalidLayout { reason: &'static str },

    /// The clock reported a time earlier than the last issued timestamp.
    ///
    /// The generator state is left untouched; once the clock catches up the
    /// instance resumes issuing IDs.
    #[error("clock moved backwards by {behind_by_ms}ms, refusing to generate id")]
    ClockRegression { behind_by_ms: u64 },

    /// The clock reported a time before the configured epoch.
    #[error("clock reads {now_ms}ms, before the configured epoch at {epoch_ms}ms")]
    ClockBeforeEpoch { now_ms: u64, epoch_ms: u64 },

    /// The elapsed time since the epoch no longer fits in the timestamp field.
    #[error("timestamp delta {delta_ms}ms exceeds the layout maximum {max_ms}ms")]
    TimestampOverflow { delta_ms: u64, max_ms: u64 },

    /// The generator lock was poisoned by a panicking thread.
    ///
    /// Not produced when the `parking-lot` feature is enabled, since those
    /// mutexes do not poison.
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}
