//! Capability traits implemented by the host device platform
//!
//! The core depends only on these traits, never on concrete device kinds:
//!
//! ```text
//! DeviceStateSource  → read snapshot, subscribe to changes
//! DeviceCommandSink  → send command
//! DevicePlatform     → both
//! ```

use std::sync::Arc;

use crate::{CommandError, DeviceCommand, DeviceError, DeviceId, DeviceSnapshot, StateNotification};

/// Callback invoked by the platform whenever a subscribed device changes
///
/// Listeners must be cheap: the core's listener only enqueues the
/// notification for its worker.
pub type StateListener = Arc<dyn Fn(StateNotification) + Send + Sync>;

/// Handle returned by [`DeviceStateSource::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Read access to device state
pub trait DeviceStateSource: Send + Sync {
    /// Check if the platform knows the device
    fn is_known(&self, device: &DeviceId) -> bool;

    /// Current snapshot for a device
    ///
    /// Unreachable or unknown devices must be reported with
    /// `available == false` rather than omitted.
    fn snapshot(&self, device: &DeviceId) -> DeviceSnapshot;

    /// Register a listener for state changes of one device
    fn subscribe(
        &self,
        device: &DeviceId,
        listener: StateListener,
    ) -> Result<SubscriptionId, DeviceError>;

    /// Remove a listener registered by `subscribe`
    fn unsubscribe(&self, subscription: SubscriptionId);
}

/// Command access to devices
pub trait DeviceCommandSink: Send + Sync {
    /// Send one command to one device
    ///
    /// Delivery and ordering guarantees belong to the implementation.
    fn send(&self, device: &DeviceId, command: DeviceCommand) -> Result<(), CommandError>;
}

/// A platform offering both state and commands
pub trait DevicePlatform: DeviceStateSource + DeviceCommandSink {}

impl<T: DeviceStateSource + DeviceCommandSink + ?Sized> DevicePlatform for T {}
