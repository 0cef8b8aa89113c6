use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_EPOCH, Error, Identity, Layout, MachineIdSplit, RandSource, Result, TWITTER_EPOCH,
};

/// Where the sequence restarts when a new millisecond begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case", tag = "kind")
)]
pub enum Reseed {
    /// Always restart at zero.
    Zero,
    /// Restart at a uniformly random value in `0..below`, which makes
    /// consecutive IDs harder to predict. Costs at most `below - 1` IDs of
    /// headroom per millisecond.
    ///
    /// The millisecond after an exhausted one is not reseeded: it starts at
    /// zero, where the sequence wrapped to.
    Random { below: u64 },
}

impl Reseed {
    pub(crate) fn next<R: RandSource + ?Sized>(&self, rand: &R) -> u64 {
        match *self {
            Self::Zero => 0,
            Self::Random { below } => rand.rand_below(below),
        }
    }
}

/// Configuration handed to a generator at construction.
///
/// Parsing these values from files, flags or the environment is the
/// embedding application's job; with the `serde` feature this type can be
/// deserialized directly, with the epoch given as `epoch_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Config {
    pub layout: Layout,
    /// Zero point of the timestamp field, as a [`Duration`] since the Unix
    /// epoch.
    #[cfg_attr(feature = "serde", serde(rename = "epoch_ms", with = "epoch_millis"))]
    pub epoch: Duration,
    pub reseed: Reseed,
    /// Group id used when a constructor does not take one.
    pub group_id: i64,
    /// Worker id used when a constructor does not take one. `None` derives it
    /// from the local hardware address.
    pub worker_id: Option<i64>,
    /// Field order used by [`Config::identity_from_machine_id`].
    pub machine_split: MachineIdSplit,
}

impl Default for Config {
    fn default() -> Self {
        Self::standard()
    }
}

impl Config {
    /// [`Layout::STANDARD`], [`DEFAULT_EPOCH`], random reseed below 32.
    pub const fn standard() -> Self {
        Self {
            layout: Layout::STANDARD,
            epoch: DEFAULT_EPOCH,
            reseed: Reseed::Random { below: 32 },
            group_id: 0,
            worker_id: None,
            machine_split: MachineIdSplit::GroupHigh,
        }
    }

    /// [`Layout::STANDARD`], [`TWITTER_EPOCH`], random reseed below 10, and a
    /// machine id whose high bits are the worker id.
    ///
    /// Reproduces IDs from older deployments anchored at the Twitter epoch.
    pub const fn legacy() -> Self {
        Self {
            layout: Layout::STANDARD,
            epoch: TWITTER_EPOCH,
            reseed: Reseed::Random { below: 10 },
            group_id: 0,
            worker_id: None,
            machine_split: MachineIdSplit::WorkerHigh,
        }
    }

    pub const fn epoch_millis(&self) -> u64 {
        self.epoch.as_millis() as u64
    }

    /// Checks the parts of the configuration that do not depend on identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] if the reseed bound is zero or leaves
    /// no room in the sequence field.
    pub fn validate(&self) -> Result<()> {
        if let Reseed::Random { below } = self.reseed {
            if below == 0 || below > self.layout.max_sequence() + 1 {
                return Err(Error::InvalidLayout {
                    reason: "reseed bound must be within 1..=max_sequence + 1",
                });
            }
        }
        Ok(())
    }

    /// Resolves the identity from [`Config::worker_id`] and
    /// [`Config::group_id`], deriving the worker id when it is unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if either id is out of range.
    pub fn identity(&self) -> Result<Identity> {
        match self.worker_id {
            Some(worker_id) => Identity::new(&self.layout, worker_id, self.group_id),
            None => Identity::derived(&self.layout, self.group_id),
        }
    }

    /// Builds an identity from one combined machine id, split according to
    /// [`Config::machine_split`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if `machine_id` is out of range.
    pub fn identity_from_machine_id(&self, machine_id: i64) -> Result<Identity> {
        Identity::from_machine_id(&self.layout, self.machine_split, machine_id)
    }
}

#[cfg(feature = "serde")]
mod epoch_millis {
    use core::time::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(epoch: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(epoch.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Components;

    #[test]
    fn presets() {
        let standard = Config::default();
        assert_eq!(standard.epoch_millis(), 1_577_836_800_000);
        assert_eq!(standard.reseed, Reseed::Random { below: 32 });
        assert!(standard.validate().is_ok());

        let legacy = Config::legacy();
        assert_eq!(legacy.epoch_millis(), 1_288_834_974_657);
        assert_eq!(legacy.reseed, Reseed::Random { below: 10 });
        assert!(legacy.validate().is_ok());
        assert_eq!(legacy.machine_split, MachineIdSplit::WorkerHigh);
        assert_eq!(standard.machine_split, MachineIdSplit::GroupHigh);
    }

    #[test]
    fn legacy_machine_id_packs_low_bits_into_group() {
        const MACHINE_ID: i64 = 0b10110_00011;
        let expected = (((MACHINE_ID & 31) << 17) | ((MACHINE_ID >> 5) << 12)) as u64;

        let legacy = Config::legacy();
        let identity = legacy.identity_from_machine_id(MACHINE_ID).unwrap();
        assert_eq!(identity.group_id(), 0b00011);
        assert_eq!(identity.worker_id(), 0b10110);
        assert_eq!(identity.bits(&legacy.layout), expected);

        let id = legacy.layout.compose(Components {
            timestamp: 1,
            group_id: identity.group_id(),
            worker_id: identity.worker_id(),
            sequence: 7,
        });
        assert_eq!(id.to_raw(), (1 << 22) | expected | 7);

        let standard = Config::standard();
        let identity = standard.identity_from_machine_id(MACHINE_ID).unwrap();
        assert_eq!(identity.bits(&standard.layout), (MACHINE_ID as u64) << 12);

        let err = legacy.identity_from_machine_id(1024).unwrap_err();
        assert!(matches!(err, Error::InvalidIdentity { .. }));
    }

    #[test]
    fn reseed_bound_must_fit_sequence() {
        let mut config = Config::default();
        for below in [0, 4097] {
            config.reseed = Reseed::Random { below };
            let err = config.validate().unwrap_err();
            assert!(matches!(err, Error::InvalidLayout { .. }));
        }
        config.reseed = Reseed::Random { below: 4096 };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn explicit_worker_id_is_validated() {
        let config = Config {
            worker_id: Some(40),
            ..Config::default()
        };
        let err = config.identity().unwrap_err();
        assert!(matches!(err, Error::InvalidIdentity { .. }));

        let config = Config {
            worker_id: Some(4),
            group_id: 2,
            ..Config::default()
        };
        let identity = config.identity().unwrap();
        assert_eq!((identity.worker_id(), identity.group_id()), (4, 2));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_from_json() {
        let json = r#"{
            "layout": {
                "timestamp_bits": 42,
                "group_bits": 4,
                "worker_bits": 6,
                "sequence_bits": 11
            },
            "epoch_ms": 1288834974657,
            "reseed": { "kind": "zero" },
            "worker_id": 9
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.layout, Layout::new(42, 4, 6, 11).unwrap());
        assert_eq!(config.epoch, TWITTER_EPOCH);
        assert_eq!(config.reseed, Reseed::Zero);
        assert_eq!(config.worker_id, Some(9));
        assert_eq!(config.group_id, 0);

        assert_eq!(config.machine_split, MachineIdSplit::GroupHigh);

        let encoded = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&encoded).unwrap();
        assert_eq!(back, config);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn rejects_invalid_layout_in_json() {
        let json = r#"{
            "layout": {
                "timestamp_bits": 41,
                "group_bits": 5,
                "worker_bits": 5,
                "sequence_bits": 20
            }
        }"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }
}
