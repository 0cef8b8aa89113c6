mod hardware;
#[cfg(test)]
mod tests;

pub use hardware::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, IdentityField, Layout, RandSource, Result, ThreadRandom};

/// How a combined machine id is divided between the group and worker
/// fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum MachineIdSplit {
    /// High bits become the group id, low bits the worker id. The machine id
    /// reads back contiguously from the packed ID.
    #[default]
    GroupHigh,
    /// High bits become the worker id, low bits the group id. Matches IDs
    /// minted by older deployments on the Twitter epoch.
    WorkerHigh,
}

/// A validated group and worker id pair.
///
/// Every ID a generator issues carries these bits. Uniqueness across
/// generators rests entirely on operators handing out disjoint identities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    group_id: u64,
    worker_id: u64,
}

impl Identity {
    /// Validates `worker_id` and `group_id` against `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if either id is negative or larger
    /// than the layout allows. Out-of-range ids are never clamped.
    ///
    /// # Example
    /// ```
    /// use snowfall::{Error, Identity, Layout};
    ///
    /// let layout = Layout::STANDARD;
    /// assert!(Identity::new(&layout, 31, 0).is_ok());
    /// assert!(matches!(
    ///     Identity::new(&layout, 32, 0),
    ///     Err(Error::InvalidIdentity { .. })
    /// ));
    /// ```
    pub fn new(layout: &Layout, worker_id: i64, group_id: i64) -> Result<Self> {
        Ok(Self {
            group_id: check(IdentityField::Group, group_id, layout.max_group_id())?,
            worker_id: check(IdentityField::Worker, worker_id, layout.max_worker_id())?,
        })
    }

    /// Splits one combined machine id across the group and worker fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if `machine_id` is outside
    /// `0..=layout.max_machine_id()`.
    ///
    /// # Example
    /// ```
    /// use snowfall::{Identity, Layout, MachineIdSplit};
    ///
    /// let layout = Layout::STANDARD;
    /// let identity = Identity::from_machine_id(&layout, MachineIdSplit::GroupHigh, 33).unwrap();
    /// assert_eq!((identity.group_id(), identity.worker_id()), (1, 1));
    ///
    /// let identity = Identity::from_machine_id(&layout, MachineIdSplit::WorkerHigh, 64).unwrap();
    /// assert_eq!((identity.group_id(), identity.worker_id()), (0, 2));
    /// ```
    pub fn from_machine_id(
        layout: &Layout,
        split: MachineIdSplit,
        machine_id: i64,
    ) -> Result<Self> {
        let machine_id = check(IdentityField::Machine, machine_id, layout.max_machine_id())?;
        let identity = match split {
            MachineIdSplit::GroupHigh => Self {
                group_id: machine_id >> layout.worker_bits(),
                worker_id: machine_id & layout.max_worker_id(),
            },
            MachineIdSplit::WorkerHigh => Self {
                group_id: machine_id & layout.max_group_id(),
                worker_id: machine_id >> layout.group_bits(),
            },
        };
        Ok(identity)
    }

    /// Builds an identity whose worker id is derived from the local hardware
    /// address.
    ///
    /// See [`derive_worker_id`] for the derivation and its caveats.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if `group_id` is out of range.
    pub fn derived(layout: &Layout, group_id: i64) -> Result<Self> {
        Self::derived_with(
            layout,
            group_id,
            &DefaultAddressSource::default(),
            &ThreadRandom,
        )
    }

    /// Like [`Identity::derived`] with an injected address source and random
    /// fallback.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if `group_id` is out of range.
    pub fn derived_with<S, R>(layout: &Layout, group_id: i64, source: &S, rand: &R) -> Result<Self>
    where
        S: HardwareAddressSource + ?Sized,
        R: RandSource + ?Sized,
    {
        let group_id = check(IdentityField::Group, group_id, layout.max_group_id())?;
        let worker_id = derive_worker_id(layout, source, rand);
        Ok(Self {
            group_id,
            worker_id,
        })
    }

    pub const fn group_id(&self) -> u64 {
        self.group_id
    }

    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// The fixed group/worker bits shared by every ID of this identity.
    pub const fn bits(&self, layout: &Layout) -> u64 {
        layout.identity_bits(self.group_id, self.worker_id)
    }
}

fn check(field: IdentityField, value: i64, max: u64) -> Result<u64> {
    match u64::try_from(value) {
        Ok(v) if v <= max => Ok(v),
        _ => Err(Error::InvalidIdentity { field, value, max }),
    }
}
