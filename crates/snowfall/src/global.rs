use std::sync::OnceLock;

use crate::{IdGenerator, LockIdGenerator, Result, SnowflakeId};

static GLOBAL: OnceLock<LockIdGenerator> = OnceLock::new();

/// Returns the process-wide generator, building it on first use from the
/// default [`Config`] with a worker id derived from the local hardware
/// address.
///
/// Convenient for single-process tools. Services that run more than one
/// process per group should construct their own generator with an assigned
/// identity instead.
///
/// If two threads race on first use, one generator is kept and both callers
/// receive it.
///
/// # Errors
///
/// Returns the construction error if the generator cannot be built. Nothing
/// is stored in that case and the next call tries again.
///
/// [`Config`]: crate::Config
pub fn global() -> Result<&'static LockIdGenerator> {
    if let Some(generator) = GLOBAL.get() {
        return Ok(generator);
    }
    let generator = LockIdGenerator::derived()?;
    Ok(GLOBAL.get_or_init(|| generator))
}

/// Generates an ID from the process-wide [`global`] generator.
///
/// # Errors
///
/// See [`global`] and [`IdGenerator::next_id`].
///
/// # Example
/// ```
/// let a = snowfall::next_id().unwrap();
/// let b = snowfall::next_id().unwrap();
/// assert!(a < b);
/// ```
pub fn next_id() -> Result<SnowflakeId> {
    global()?.next_id()
}
