use ::rand::{Rng, rng};

/// A trait for random sources.
///
/// Used to pick the sequence starting point on each new millisecond and to
/// fall back to a random worker id. Plug in a fixed source in tests.
///
/// # Example
/// ```
/// use snowfall::RandSource;
///
/// struct FixedRand;
/// impl RandSource for FixedRand {
///     fn rand(&self) -> u64 {
///         1234
///     }
/// }
///
/// let rng = FixedRand;
/// assert_eq!(rng.rand(), 1234);
/// assert_eq!(rng.rand_below(1000), 234);
/// ```
pub trait RandSource {
    /// Returns a random integer.
    fn rand(&self) -> u64;

    /// Returns a random integer in `0..bound`. `bound` must be non-zero.
    fn rand_below(&self, bound: u64) -> u64 {
        self.rand() % bound
    }
}

impl<R: RandSource + ?Sized> RandSource for &R {
    fn rand(&self) -> u64 {
        (**self).rand()
    }

    fn rand_below(&self, bound: u64) -> u64 {
        (**self).rand_below(bound)
    }
}

/// A `RandSource` that uses the thread-local RNG (`rand::rng()`).
///
/// Each OS thread has its own RNG instance, so calls from multiple threads are
/// contention-free. This type does **not** store the RNG itself; it accesses
/// the thread-local generator on each call, so it is `Send + Sync`.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn rand(&self) -> u64 {
        rng().random()
    }

    fn rand_below(&self, bound: u64) -> u64 {
        rng().random_range(0..bound)
    }
}
