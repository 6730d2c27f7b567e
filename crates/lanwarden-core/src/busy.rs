// ── Busy-key set ──
//
// Client-side at-most-one-in-flight tracking for mutations. Keys are
// typed per operation; no string concatenation, so a device named
// "60" can never collide with a schedule row.

use std::fmt;

use dashmap::DashMap;
use tokio::sync::watch;
use uuid::Uuid;

use crate::model::DeviceKey;

/// Identity of an in-flight mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BusyKey {
    /// Approve or revoke of one device row.
    Device(DeviceKey),
    /// Creation of one schedule.
    Plan { interval: i64, target: String },
    /// Immediate run of one schedule row.
    Run(Uuid),
    /// Pause of one schedule row.
    Pause(Uuid),
    /// Deletion of one schedule row.
    Delete(Uuid),
}

impl fmt::Display for BusyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusyKey::Device(key) => write!(f, "device {key}"),
            BusyKey::Plan { interval, target } => {
                write!(f, "plan {target} every {interval}m")
            }
            BusyKey::Run(id) => write!(f, "run {id}"),
            BusyKey::Pause(id) => write!(f, "pause {id}"),
            BusyKey::Delete(id) => write!(f, "delete {id}"),
        }
    }
}

/// Concurrent set of busy keys with change notification.
///
/// Mutations acquire their key before the first network call and
/// release it on every exit path. UIs subscribe to re-render rows as
/// busy spans open and close.
pub struct BusySet {
    keys: DashMap<BusyKey, ()>,
    version: watch::Sender<u64>,
}

impl BusySet {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            keys: DashMap::new(),
            version,
        }
    }

    /// Try to mark a key busy. Returns `false` if it already is.
    pub fn try_acquire(&self, key: BusyKey) -> bool {
        let acquired = self.keys.insert(key, ()).is_none();
        if acquired {
            self.bump();
        }
        acquired
    }

    /// Release a key. Releasing a key that is not held is a no-op.
    pub fn release(&self, key: &BusyKey) {
        if self.keys.remove(key).is_some() {
            self.bump();
        }
    }

    pub fn contains(&self, key: &BusyKey) -> bool {
        self.keys.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Subscribe to busy-set transitions (version bumps on every
    /// acquire and release).
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

impl Default for BusySet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::MacAddress;

    fn device_key() -> BusyKey {
        BusyKey::Device(DeviceKey {
            mac: MacAddress::parse("aa:bb:cc:dd:ee:ff").unwrap(),
            ip: "192.168.1.10".into(),
        })
    }

    #[test]
    fn acquire_is_exclusive_until_release() {
        let set = BusySet::new();
        assert!(set.try_acquire(device_key()));
        assert!(!set.try_acquire(device_key()));
        set.release(&device_key());
        assert!(set.try_acquire(device_key()));
    }

    #[test]
    fn typed_keys_do_not_collide() {
        let set = BusySet::new();
        let id = Uuid::new_v4();
        assert!(set.try_acquire(BusyKey::Run(id)));
        assert!(set.try_acquire(BusyKey::Pause(id)));
        assert!(set.try_acquire(BusyKey::Delete(id)));
        assert!(set.try_acquire(BusyKey::Plan {
            interval: 60,
            target: "192.168.1.0/24".into()
        }));
    }

    #[test]
    fn transitions_bump_version() {
        let set = BusySet::new();
        let rx = set.subscribe();
        let start = *rx.borrow();

        set.try_acquire(device_key());
        set.release(&device_key());
        // Releasing an unheld key must not notify.
        set.release(&device_key());

        assert_eq!(*rx.borrow(), start + 2);
    }
}
