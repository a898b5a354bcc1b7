//! Change-detecting cache of device snapshots

use std::collections::HashMap;

use stack_model::{DeviceId, DeviceSnapshot};

/// Read access to device snapshots
///
/// Implemented by [`SnapshotCache`] and by a plain `HashMap`, so the resolver
/// and catalogue can be driven from either.
pub trait SnapshotView {
    /// Snapshot for a device, `None` if the device never reported
    fn snapshot(&self, device: &DeviceId) -> Option<&DeviceSnapshot>;
}

impl SnapshotView for HashMap<DeviceId, DeviceSnapshot> {
    fn snapshot(&self, device: &DeviceId) -> Option<&DeviceSnapshot> {
        self.get(device)
    }
}

/// Last-known snapshot per device
///
/// Change detection is built in via `PartialEq` comparison.
///
/// # Example
///
/// ```rust
/// use media_stack::SnapshotCache;
/// use stack_model::{DeviceId, DeviceSnapshot};
///
/// let mut cache = SnapshotCache::new();
/// let tv = DeviceId::new("tv");
///
/// assert!(cache.set(tv.clone(), DeviceSnapshot::available()));
/// assert!(!cache.set(tv.clone(), DeviceSnapshot::available()));
/// assert!(cache.set(tv, DeviceSnapshot::unavailable()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    snapshots: HashMap<DeviceId, DeviceSnapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, device: &DeviceId) -> Option<&DeviceSnapshot> {
        self.snapshots.get(device)
    }

    /// Store a snapshot, returning whether it differs from the cached one
    pub fn set(&mut self, device: DeviceId, snapshot: DeviceSnapshot) -> bool {
        if self.snapshots.get(&device) != Some(&snapshot) {
            self.snapshots.insert(device, snapshot);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl SnapshotView for SnapshotCache {
    fn snapshot(&self, device: &DeviceId) -> Option<&DeviceSnapshot> {
        self.get(device)
    }
}
