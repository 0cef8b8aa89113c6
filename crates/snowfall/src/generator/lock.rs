use core::time::Duration;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Config, IdGenStatus, IdGenerator, Identity, Layout, RandSource, Result, SnowflakeId,
    SystemClock, ThreadRandom, TimeSource,
    generator::{Mutex, Sequencer},
};

/// A lock-based ID generator suitable for multi-threaded environments.
///
/// The last issued ID is kept behind an [`Arc<Mutex<_>>`], and the clock is
/// read while the lock is held, so the check-and-update of timestamp and
/// sequence is a single critical section. Clones share the same state.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Fair access across threads (with `parking-lot`)
///
/// ## See Also
/// - [`AtomicIdGenerator`]
///
/// [`AtomicIdGenerator`]: crate::AtomicIdGenerator
pub struct LockIdGenerator<T = SystemClock, R = ThreadRandom>
where
    T: TimeSource,
    R: RandSource,
{
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<u64>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<u64>>,
    sequencer: Arc<Sequencer<T, R>>,
}

impl<T, R> Clone for LockIdGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            sequencer: Arc::clone(&self.sequencer),
        }
    }
}

impl LockIdGenerator {
    /// Creates a generator for `worker_id` in `group_id` with the default
    /// [`Config`], the system clock and thread-local randomness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if either id is outside `0..=31`.
    ///
    /// # Example
    /// ```
    /// use snowfall::{IdGenerator, LockIdGenerator};
    ///
    /// let generator = LockIdGenerator::new(1, 0).unwrap();
    /// let id = generator.next_id().unwrap();
    /// assert_eq!(generator.decode(id).worker_id, 1);
    ///
    /// assert!(LockIdGenerator::new(32, 0).is_err());
    /// ```
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
    /// address, see [`derive_worker_id`].
    ///
    /// ⚠️ Not safe for fleets where several processes may derive the same
    /// worker id. Prefer explicit identities in production.
    ///
    /// # Errors
    ///
    /// Returns an error only if the default configuration is invalid.
    ///
    /// [`derive_worker_id`]: crate::derive_worker_id
    pub fn derived() -> Result<Self> {
        Self::configured(&Config::default())
    }

    /// Creates a generator from `config`, resolving the identity with
    /// [`Config::identity`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] or [`Error::InvalidLayout`] if the
    /// configuration is invalid.
    ///
    /// [`Error::InvalidIdentity`]: crate::Error::InvalidIdentity
    /// [`Error::InvalidLayout`]: crate::Error::InvalidLayout
    pub fn configured(config: &Config) -> Result<Self> {
        Self::from_config(config, config.identity()?, SystemClock, ThreadRandom)
    }
}

impl<T, R> LockIdGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    /// Creates a generator from explicit parts.
    ///
    /// # Parameters
    /// - `config`: layout, epoch and reseed policy. The identity defaults in
    ///   `config` are ignored in favour of `identity`.
    /// - `identity`: the group and worker id encoded into every ID.
    /// - `time`: a [`TimeSource`] returning Unix milliseconds.
    /// - `rand`: a [`RandSource`] used to reseed the sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] if the reseed policy does not fit the
    /// layout, or [`Error::InvalidIdentity`] if `identity` does not fit it.
    ///
    /// [`Error::InvalidIdentity`]: crate::Error::InvalidIdentity
    /// [`Error::InvalidLayout`]: crate::Error::InvalidLayout
    pub fn from_config(config: &Config, identity: Identity, time: T, rand: R) -> Result<Self> {
        let sequencer = Sequencer::new(config, identity, time, rand)?;
        let initial = sequencer.initial_state();
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(initial))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(initial)),
            sequencer: Arc::new(sequencer),
        })
    }

    /// Attempts to generate the next ID, see [`IdGenerator::poll_id`].
    ///
    /// # Errors
    ///
    /// See [`IdGenerator::poll_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<IdGenStatus> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        // The clock is sampled under the lock so a slower thread can never
        // observe a timestamp older than one already committed.
        let now = self.sequencer.now()?;
        match self.sequencer.advance(*state, now)? {
            Some(next) => {
                *state = next;
                Ok(IdGenStatus::Ready {
                    id: SnowflakeId::from_raw(next),
                })
            }
            None => Ok(IdGenStatus::Pending { yield_for: 1 }),
        }
    }
}

impl<T, R> IdGenerator for LockIdGenerator<T, R>
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
