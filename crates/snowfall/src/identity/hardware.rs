#[cfg(feature = "tracing")]
use tracing::{info, warn};

use crate::{Layout, RandSource};

/// A source of a local hardware identifier used to seed a default worker id.
///
/// This is a best-effort convenience. Two hosts can easily reduce to the same
/// worker id, so production fleets should assign identities explicitly.
pub trait HardwareAddressSource {
    /// Returns the local hardware (MAC) address, or `None` if no usable
    /// interface exists.
    fn hardware_address(&self) -> Option<[u8; 6]>;
}

impl<S: HardwareAddressSource + ?Sized> HardwareAddressSource for &S {
    fn hardware_address(&self) -> Option<[u8; 6]> {
        (**self).hardware_address()
    }
}

/// Reads the MAC address of the first usable network interface.
#[cfg_attr(docsrs, doc(cfg(feature = "mac-address")))]
#[cfg(feature = "mac-address")]
#[derive(Clone, Copy, Debug, Default)]
pub struct MacAddressSource;

#[cfg(feature = "mac-address")]
impl HardwareAddressSource for MacAddressSource {
    fn hardware_address(&self) -> Option<[u8; 6]> {
        match mac_address::get_mac_address() {
            Ok(Some(mac)) => Some(mac.bytes()),
            Ok(None) => None,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                warn!(error = %_e, "failed to read local mac address");
                None
            }
        }
    }
}

/// An address source that never finds an address. Forces the random
/// fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHardwareAddress;

impl HardwareAddressSource for NoHardwareAddress {
    fn hardware_address(&self) -> Option<[u8; 6]> {
        None
    }
}

/// The address source used by [`Identity::derived`].
///
/// [`Identity::derived`]: crate::Identity::derived
#[cfg(feature = "mac-address")]
pub type DefaultAddressSource = MacAddressSource;

/// The address source used by [`Identity::derived`].
///
/// [`Identity::derived`]: crate::Identity::derived
#[cfg(not(feature = "mac-address"))]
pub type DefaultAddressSource = NoHardwareAddress;

/// Derives a worker id from a hardware address.
///
/// The address bytes are summed and reduced modulo the worker-id range, so
/// the result is always valid for `layout`. Without an address a uniformly
/// random worker id is chosen instead and a warning is logged: random worker
/// ids are not safe when several processes share a group.
pub fn derive_worker_id<S, R>(layout: &Layout, source: &S, rand: &R) -> u64
where
    S: HardwareAddressSource + ?Sized,
    R: RandSource + ?Sized,
{
    let range = layout.max_worker_id() + 1;
    match source.hardware_address() {
        Some(mac) => {
            let sum: u64 = mac.iter().map(|&b| u64::from(b)).sum();
            let worker_id = sum % range;
            #[cfg(feature = "tracing")]
            info!(worker_id, "derived worker id from local mac address");
            worker_id
        }
        None => {
            let worker_id = rand.rand_below(range);
            #[cfg(feature = "tracing")]
            warn!(
                worker_id,
                "no local mac address, using a random worker id; not suitable for production"
            );
            worker_id
        }
    }
}
