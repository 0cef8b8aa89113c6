use core::time::Duration;

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Config, IdGenStatus, IdGenerator, Identity, Layout, RandSource, Result, SnowflakeId,
    SystemClock, ThreadRandom, TimeSource, generator::Sequencer,
};

/// A lock-free ID generator suitable for multi-threaded environments.
///
/// The last issued ID lives in an [`AtomicU64`] and each attempt publishes its
/// successor with a single compare-and-swap, so at most one caller wins each
/// transition. A caller that loses the race gets [`IdGenStatus::Pending`] with
/// `yield_for: 0` and retries immediately.
///
/// ## Features
/// - ✅ Thread-safe
/// - ❌ Fair access (throughput is favoured over fairness)
///
/// ## See Also
/// - [`LockIdGenerator`]
///
/// [`LockIdGenerator`]: crate::LockIdGenerator
pub struct AtomicIdGenerator<T = SystemClock, R = ThreadRandom>
where
    T: TimeSource,
    R: RandSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    sequencer: Sequencer<T, R>,
}

impl AtomicIdGenerator {
    /// Creates a generator for `worker_id` in `group_id` with the default
    /// [`Config`], the system clock and thread-local randomness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if either id is outside `0..=31`.
    ///
    /// [`Error::InvalidIdentity`]: crate::Error::InvalidIdentity
    pub fn new(worker_id: i64, group_id: i64) -> Result<Self> {
        let config = Config::default();
        let identity = Identity::new(&config.layout, worker_id, group_id)?;
        Self::from_config(&config, identity, SystemClock, ThreadRandom)
    }

    /// Creates a generator for `worker_id`, taking the group id from the
    /// default [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if `worker_id` is out of range.
    ///
    /// [`Error::InvalidIdentity`]: crate::Error::InvalidIdentity
    pub fn with_worker(worker_id: i64) -> Result<Self> {
        let config = Config::default();
        let identity = Identity::new(&config.layout, worker_id, config.group_id)?;
        Self::from_config(&config, identity, SystemClock, ThreadRandom)
    }

    /// Creates a generator whose worker id is derived from the local hardware
    /// address. Same caveats as [`LockIdGenerator::derived`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the default configuration is invalid.
    ///
    /// [`LockIdGenerator::derived`]: crate::LockIdGenerator::derived
    pub fn derived() -> Result<Self> {
        Self::configured(&Config::default())
    }

    /// Creates a generator from `config`, resolving the identity with
    /// [`Config::identity`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn configured(config: &Config) -> Result<Self> {
        Self::from_config(config, config.identity()?, SystemClock, ThreadRandom)
    }
}

impl<T, R> AtomicIdGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    /// Creates a generator from explicit parts. See
    /// [`LockIdGenerator::from_config`].
    ///
    /// # Errors
    ///
    /// Returns an error if `config` or `identity` is invalid.
    ///
    /// [`LockIdGenerator::from_config`]: crate::LockIdGenerator::from_config
    pub fn from_config(config: &Config, identity: Identity, time: T, rand: R) -> Result<Self> {
        let sequencer = Sequencer::new(config, identity, time, rand)?;
        let initial = sequencer.initial_state();
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(initial)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(initial),
            sequencer,
        })
    }

    /// Attempts to generate the next ID, see [`IdGenerator::poll_id`].
    ///
    /// # Errors
    ///
    /// See [`IdGenerator::poll_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<IdGenStatus> {
        // Load before sampling the clock: any timestamp already published was
        // read earlier, so `now` cannot trail it unless the clock regressed.
        let current = self.state.load(Ordering::Acquire);
        let now = self.sequencer.now()?;

        let Some(next) = self.sequencer.advance(current, now)? else {
            return Ok(IdGenStatus::Pending { yield_for: 1 });
        };

        if self
            .state
            .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Ok(IdGenStatus::Ready {
                id: SnowflakeId::from_raw(next),
            })
        } else {
            // CAS failed - another thread won the race. Yield 0 to retry
            // immediately.
            Ok(IdGenStatus::Pending { yield_for: 0 })
        }
    }
}

impl<T, R> IdGenerator for AtomicIdGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    fn layout(&self) -> &Layout {
        self.sequencer.layout()
    }

    fn epoch(&self) -> Duration {
        self.sequencer.epoch()
    }

    fn identity(&self) -> Identity {
        self.sequencer.identity()
    }

    fn poll_id(&self) -> Result<IdGenStatus> {
        self.poll_id()
    }
}
