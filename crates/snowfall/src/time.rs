use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default epoch: Wednesday, January 1, 2020 00:00:00 UTC
///
/// With [`Layout::STANDARD`] IDs anchored here stop fitting after
/// 2089-09-06T15:47:35.551Z.
///
/// [`Layout::STANDARD`]: crate::Layout::STANDARD
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_577_836_800_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
///
/// With [`Layout::STANDARD`] IDs anchored here stop fitting after
/// 2080-07-10T17:30:30.208Z.
///
/// [`Layout::STANDARD`]: crate::Layout::STANDARD
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// A trait for time sources that return a wall-clock timestamp.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests.
///
/// The unit is **milliseconds since the Unix epoch**. Generators subtract
/// their configured epoch themselves, so one clock can serve generators with
/// different epochs.
///
/// # Example
///
/// ```
/// use snowfall::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// The system wall clock.
///
/// Unlike a monotonic timer this follows NTP corrections and manual
/// adjustments, which is exactly what lets generators detect a clock that
/// moved backwards instead of silently reusing timestamps.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        // A clock before 1970 reads as zero, which every epoch rejects.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}
