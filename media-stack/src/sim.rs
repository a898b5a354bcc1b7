//! In-memory device platform
//!
//! [`SimulatedPlatform`] implements both capability traits over a table of
//! snapshots. Tests and demos drive it by replacing snapshots; every change
//! is delivered synchronously to the subscribed listeners.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use stack_model::{
    CommandError, DeviceCommand, DeviceCommandSink, DeviceError, DeviceId, DeviceSnapshot,
    DeviceStateSource, PlaybackState, StateListener, StateNotification, SubscriptionId,
};

#[derive(Default)]
struct Inner {
    devices: HashMap<DeviceId, DeviceSnapshot>,
    listeners: HashMap<SubscriptionId, (DeviceId, StateListener)>,
    sent: Vec<(DeviceId, DeviceCommand)>,
    failures: HashMap<DeviceId, CommandError>,
    apply_commands: bool,
}

/// A device platform held entirely in memory
///
/// # Example
///
/// ```rust
/// use media_stack::sim::SimulatedPlatform;
/// use stack_model::{DeviceCommand, DeviceCommandSink, DeviceSnapshot, DeviceStateSource};
///
/// let platform = SimulatedPlatform::new()
///     .with_device("tv", DeviceSnapshot::available().with_source("HDMI 1"));
///
/// platform.send(&"tv".into(), DeviceCommand::TurnOff).unwrap();
/// assert_eq!(platform.sent_commands().len(), 1);
/// assert!(platform.is_known(&"tv".into()));
/// ```
#[derive(Default)]
pub struct SimulatedPlatform {
    inner: RwLock<Inner>,
    next_subscription: AtomicU64,
}

impl SimulatedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(self, device: impl Into<DeviceId>, snapshot: DeviceSnapshot) -> Self {
        self.add_device(device, snapshot);
        self
    }

    /// Register a device without notifying listeners
    pub fn add_device(&self, device: impl Into<DeviceId>, snapshot: DeviceSnapshot) {
        self.inner.write().devices.insert(device.into(), snapshot);
    }

    /// Replace a device's snapshot and notify its listeners
    pub fn set_snapshot(&self, device: impl Into<DeviceId>, snapshot: DeviceSnapshot) {
        let device = device.into();
        let listeners = {
            let mut inner = self.inner.write();
            inner.devices.insert(device.clone(), snapshot.clone());
            listeners_for(&inner, &device)
        };

        // Outside the lock so listeners may call back into the platform
        for listener in listeners {
            listener(StateNotification::new(device.clone(), snapshot.clone()));
        }
    }

    /// Modify a device's snapshot in place and notify its listeners
    ///
    /// Unknown devices start from [`DeviceSnapshot::unavailable`].
    pub fn update<F>(&self, device: impl Into<DeviceId>, f: F)
    where
        F: FnOnce(&mut DeviceSnapshot),
    {
        let device = device.into();
        let mut snapshot = self.snapshot(&device);
        f(&mut snapshot);
        self.set_snapshot(device, snapshot);
    }

    /// Mark a device unreachable, keeping the rest of its snapshot
    pub fn set_unavailable(&self, device: impl Into<DeviceId>) {
        self.update(device, |snapshot| snapshot.available = false);
    }

    /// Commands received so far, in order
    pub fn sent_commands(&self) -> Vec<(DeviceId, DeviceCommand)> {
        self.inner.read().sent.clone()
    }

    pub fn take_sent_commands(&self) -> Vec<(DeviceId, DeviceCommand)> {
        std::mem::take(&mut self.inner.write().sent)
    }

    /// Make every command to `device` fail with `error`
    pub fn fail_commands_for(&self, device: impl Into<DeviceId>, error: CommandError) {
        self.inner.write().failures.insert(device.into(), error);
    }

    pub fn clear_failure(&self, device: &DeviceId) {
        self.inner.write().failures.remove(device);
    }

    /// Whether accepted commands also change the target's snapshot
    ///
    /// Disabled by default: commands are only recorded.
    pub fn apply_commands(&self, enabled: bool) {
        self.inner.write().apply_commands = enabled;
    }

    /// Number of live subscriptions
    pub fn listener_count(&self) -> usize {
        self.inner.read().listeners.len()
    }
}

fn listeners_for(inner: &Inner, device: &DeviceId) -> Vec<StateListener> {
    inner
        .listeners
        .values()
        .filter(|(subscribed, _)| subscribed == device)
        .map(|(_, listener)| listener.clone())
        .collect()
}

/// Effect of a command on a device's snapshot
fn apply_command(snapshot: &mut DeviceSnapshot, command: &DeviceCommand) {
    const VOLUME_STEP: f32 = 0.05;

    match command {
        DeviceCommand::SetVolume(level) => snapshot.volume_level = Some(level.clamp(0.0, 1.0)),
        DeviceCommand::VolumeUp => {
            let level = snapshot.volume_level.unwrap_or(0.0) + VOLUME_STEP;
            snapshot.volume_level = Some(level.min(1.0));
        }
        DeviceCommand::VolumeDown => {
            let level = snapshot.volume_level.unwrap_or(0.0) - VOLUME_STEP;
            snapshot.volume_level = Some(level.max(0.0));
        }
        DeviceCommand::SetMute(muted) => snapshot.is_muted = Some(*muted),
        DeviceCommand::Play => snapshot.playback_state = PlaybackState::Playing,
        DeviceCommand::Pause => snapshot.playback_state = PlaybackState::Paused,
        DeviceCommand::PlayPause => {
            snapshot.playback_state = if snapshot.playback_state == PlaybackState::Playing {
                PlaybackState::Paused
            } else {
                PlaybackState::Playing
            }
        }
        DeviceCommand::Stop | DeviceCommand::TurnOn => snapshot.playback_state = PlaybackState::Idle,
        DeviceCommand::TurnOff => snapshot.playback_state = PlaybackState::Off,
        DeviceCommand::SelectSource(label) => snapshot.selected_source = Some(label.clone()),
        DeviceCommand::SetShuffle(shuffle) => snapshot.shuffle = Some(*shuffle),
        DeviceCommand::PlayMedia { .. } => snapshot.playback_state = PlaybackState::Playing,
        DeviceCommand::NextTrack
        | DeviceCommand::PreviousTrack
        | DeviceCommand::Seek(_)
        | DeviceCommand::ClearPlaylist => {}
    }
}

impl DeviceStateSource for SimulatedPlatform {
    fn is_known(&self, device: &DeviceId) -> bool {
        self.inner.read().devices.contains_key(device)
    }

    fn snapshot(&self, device: &DeviceId) -> DeviceSnapshot {
        self.inner
            .read()
            .devices
            .get(device)
            .cloned()
            .unwrap_or_else(DeviceSnapshot::unavailable)
    }

    fn subscribe(
        &self,
        device: &DeviceId,
        listener: StateListener,
    ) -> Result<SubscriptionId, DeviceError> {
        let mut inner = self.inner.write();
        if !inner.devices.contains_key(device) {
            return Err(DeviceError::NotFound(device.clone()));
        }

        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        inner.listeners.insert(id, (device.clone(), listener));
        tracing::trace!("Subscribed {:?} to {}", id, device);
        Ok(id)
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        self.inner.write().listeners.remove(&subscription);
    }
}

impl DeviceCommandSink for SimulatedPlatform {
    fn send(&self, device: &DeviceId, command: DeviceCommand) -> Result<(), CommandError> {
        let updated = {
            let mut inner = self.inner.write();
            if let Some(error) = inner.failures.get(device) {
                return Err(error.clone());
            }
            let apply = inner.apply_commands;
            let snapshot = match inner.devices.get_mut(device) {
                Some(snapshot) if snapshot.available => snapshot,
                Some(_) => return Err(CommandError::Unreachable(device.clone())),
                None => return Err(CommandError::Failed(format!("unknown device {}", device))),
            };

            let updated = if apply {
                apply_command(snapshot, &command);
                Some(snapshot.clone())
            } else {
                None
            };
            inner.sent.push((device.clone(), command));
            updated
        };

        if let Some(snapshot) = updated {
            self.set_snapshot(device.clone(), snapshot);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recorder() -> (StateListener, Arc<Mutex<Vec<StateNotification>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: StateListener = Arc::new(move |n| sink.lock().push(n));
        (listener, seen)
    }

    #[test]
    fn test_unknown_device_reads_unavailable() {
        let platform = SimulatedPlatform::new();
        assert!(!platform.is_known(&"tv".into()));
        assert_eq!(platform.snapshot(&"tv".into()), DeviceSnapshot::unavailable());
    }

    #[test]
    fn test_listeners_receive_updates_for_their_device() {
        let platform = SimulatedPlatform::new()
            .with_device("tv", DeviceSnapshot::available())
            .with_device("stereo", DeviceSnapshot::available());
        let (listener, seen) = recorder();
        let id = platform.subscribe(&"tv".into(), listener).unwrap();

        platform.update("tv", |s| s.selected_source = Some("HDMI 1".into()));
        platform.update("stereo", |s| s.selected_source = Some("PVR".into()));

        let seen_now = seen.lock().clone();
        assert_eq!(seen_now.len(), 1);
        assert_eq!(seen_now[0].device.as_str(), "tv");

        platform.unsubscribe(id);
        assert_eq!(platform.listener_count(), 0);
        platform.set_unavailable("tv");
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_subscribe_unknown_device() {
        let platform = SimulatedPlatform::new();
        let (listener, _) = recorder();
        assert!(matches!(
            platform.subscribe(&"tv".into(), listener),
            Err(DeviceError::NotFound(_))
        ));
    }

    #[test]
    fn test_commands_to_unavailable_device_fail() {
        let platform = SimulatedPlatform::new().with_device("tv", DeviceSnapshot::unavailable());
        assert_eq!(
            platform.send(&"tv".into(), DeviceCommand::Play),
            Err(CommandError::Unreachable("tv".into()))
        );
        assert!(platform.sent_commands().is_empty());
    }

    #[test]
    fn test_injected_failure() {
        let platform = SimulatedPlatform::new().with_device("tv", DeviceSnapshot::available());
        let error = CommandError::Rejected {
            device: "tv".into(),
            command: "play",
            reason: "busy".into(),
        };
        platform.fail_commands_for("tv", error.clone());
        assert_eq!(platform.send(&"tv".into(), DeviceCommand::Play), Err(error));

        platform.clear_failure(&"tv".into());
        assert!(platform.send(&"tv".into(), DeviceCommand::Play).is_ok());
    }

    #[test]
    fn test_applied_commands_update_snapshot() {
        let platform = SimulatedPlatform::new().with_device(
            "tv",
            DeviceSnapshot::available().with_playback_state(PlaybackState::Off),
        );
        platform.apply_commands(true);

        platform.send(&"tv".into(), DeviceCommand::TurnOn).unwrap();
        platform
            .send(&"tv".into(), DeviceCommand::SelectSource("HDMI 2".into()))
            .unwrap();
        platform.send(&"tv".into(), DeviceCommand::SetVolume(1.4)).unwrap();

        let snapshot = platform.snapshot(&"tv".into());
        assert_eq!(snapshot.playback_state, PlaybackState::Idle);
        assert_eq!(snapshot.selected_source.as_deref(), Some("HDMI 2"));
        assert_eq!(snapshot.volume_level, Some(1.0));
        assert_eq!(platform.take_sent_commands().len(), 3);
        assert!(platform.sent_commands().is_empty());
    }
}
