use crate::{
    Error, HardwareAddressSource, Identity, IdentityField, Layout, MachineIdSplit,
    NoHardwareAddress, RandSource, derive_worker_id,
};

struct FixedAddress([u8; 6]);

impl HardwareAddressSource for FixedAddress {
    fn hardware_address(&self) -> Option<[u8; 6]> {
        Some(self.0)
    }
}

struct FixedRand(u64);

impl RandSource for FixedRand {
    fn rand(&self) -> u64 {
        self.0
    }
}

#[test]
fn accepts_range_bounds() {
    let layout = Layout::STANDARD;
    let low = Identity::new(&layout, 0, 0).unwrap();
    assert_eq!((low.worker_id(), low.group_id()), (0, 0));
    let high = Identity::new(&layout, 31, 31).unwrap();
    assert_eq!((high.worker_id(), high.group_id()), (31, 31));
}

#[test]
fn rejects_out_of_range_worker() {
    let layout = Layout::STANDARD;
    assert_eq!(
        Identity::new(&layout, 32, 0),
        Err(Error::InvalidIdentity {
            field: IdentityField::Worker,
            value: 32,
            max: 31,
        })
    );
    assert!(matches!(
        Identity::new(&layout, -1, 0),
        Err(Error::InvalidIdentity {
            field: IdentityField::Worker,
            ..
        })
    ));
}

#[test]
fn rejects_negative_group() {
    let layout = Layout::STANDARD;
    assert_eq!(
        Identity::new(&layout, 0, -1),
        Err(Error::InvalidIdentity {
            field: IdentityField::Group,
            value: -1,
            max: 31,
        })
    );
    assert!(Identity::new(&layout, 0, 32).is_err());
}

#[test]
fn identity_bits_sit_between_timestamp_and_sequence() {
    let layout = Layout::STANDARD;
    let identity = Identity::new(&layout, 1, 1).unwrap();
    assert_eq!(identity.bits(&layout), (1 << 17) | (1 << 12));
}

#[test]
fn machine_id_group_high_split() {
    let layout = Layout::STANDARD;
    let split = MachineIdSplit::GroupHigh;
    let identity = Identity::from_machine_id(&layout, split, 0b10110_00011).unwrap();
    assert_eq!(identity.group_id(), 0b10110);
    assert_eq!(identity.worker_id(), 0b00011);
    assert_eq!(identity.bits(&layout), 0b10110_00011 << 12);

    assert!(Identity::from_machine_id(&layout, split, 1023).is_ok());
    assert!(matches!(
        Identity::from_machine_id(&layout, split, 1024),
        Err(Error::InvalidIdentity {
            field: IdentityField::Machine,
            ..
        })
    ));
}

#[test]
fn machine_id_worker_high_split() {
    let layout = Layout::STANDARD;
    let split = MachineIdSplit::WorkerHigh;
    let machine_id: i64 = 0b10110_00011;
    let identity = Identity::from_machine_id(&layout, split, machine_id).unwrap();
    assert_eq!(identity.group_id(), 0b00011);
    assert_eq!(identity.worker_id(), 0b10110);

    let expected = ((machine_id & 31) << 17) | ((machine_id >> 5) << 12);
    assert_eq!(identity.bits(&layout), expected as u64);

    let max = Identity::from_machine_id(&layout, split, 1023).unwrap();
    assert_eq!((max.group_id(), max.worker_id()), (31, 31));
    assert!(Identity::from_machine_id(&layout, split, -1).is_err());
}

#[test]
fn worker_id_from_mac_is_byte_sum_mod_range() {
    let layout = Layout::STANDARD;
    // 0x02 + 0x42 + 0xac + 0x11 + 0x00 + 0x02 = 259, 259 % 32 = 3
    let mac = FixedAddress([0x02, 0x42, 0xac, 0x11, 0x00, 0x02]);
    assert_eq!(derive_worker_id(&layout, &mac, &FixedRand(7)), 3);

    let identity = Identity::derived_with(&layout, 3, &mac, &FixedRand(7)).unwrap();
    assert_eq!(identity.worker_id(), 3);
    assert_eq!(identity.group_id(), 3);
}

#[test]
fn worker_id_falls_back_to_random_in_range() {
    let layout = Layout::STANDARD;
    assert_eq!(
        derive_worker_id(&layout, &NoHardwareAddress, &FixedRand(70)),
        70 % 32
    );
    assert_eq!(
        derive_worker_id(&layout, &NoHardwareAddress, &FixedRand(u64::MAX)),
        31
    );
}

#[test]
fn derived_identity_still_validates_group() {
    let layout = Layout::STANDARD;
    let result = Identity::derived_with(&layout, 32, &NoHardwareAddress, &FixedRand(0));
    assert!(result.is_err());
    let identity = Identity::derived(&layout, 0).unwrap();
    assert!(identity.worker_id() <= layout.max_worker_id());
}
