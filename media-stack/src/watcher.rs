//! Async watcher over the composite state

use tokio::sync::watch;

use crate::composite::VirtualDeviceState;

/// Watches the composite state of a virtual device
///
/// Backed by a `tokio::sync::watch` channel: only the latest state is kept,
/// intermediate states may be skipped by slow consumers.
///
/// # Example
///
/// ```rust,ignore
/// let mut watcher = device.watch();
/// while watcher.changed().await.is_ok() {
///     let state = watcher.current();
///     println!("{} is {:?}", state.name, state.playback_state);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct StateWatcher {
    rx: watch::Receiver<VirtualDeviceState>,
}

impl StateWatcher {
    pub(crate) fn new(rx: watch::Receiver<VirtualDeviceState>) -> Self {
        Self { rx }
    }

    /// The latest published state
    pub fn current(&self) -> VirtualDeviceState {
        self.rx.borrow().clone()
    }

    /// Wait until a new state is published
    ///
    /// Fails once the virtual device has been dropped.
    pub async fn changed(&mut self) -> Result<VirtualDeviceState, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Whether a state was published since the last `changed`
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stack_model::{DeviceId, FeatureSet, PlaybackState};

    fn state(playback_state: PlaybackState) -> VirtualDeviceState {
        VirtualDeviceState {
            name: "Lounge".to_string(),
            available: true,
            playback_state,
            media_metadata: None,
            volume_level: Some(0.4),
            is_muted: Some(false),
            root_device: DeviceId::new("tv"),
            active_source_device: DeviceId::new("tv"),
            source: None,
            source_list: Vec::new(),
            shuffle: None,
            supported_features: FeatureSet::empty(),
        }
    }

    #[tokio::test]
    async fn test_changed_yields_latest() {
        let (tx, rx) = watch::channel(state(PlaybackState::Idle));
        let mut watcher = StateWatcher::new(rx);
        assert!(!watcher.has_changed());

        tx.send_replace(state(PlaybackState::Paused));
        tx.send_replace(state(PlaybackState::Playing));
        assert!(watcher.has_changed());

        let latest = watcher.changed().await.unwrap();
        assert_eq!(latest.playback_state, PlaybackState::Playing);
        assert!(!watcher.has_changed());
    }

    #[tokio::test]
    async fn test_closed_sender() {
        let (tx, rx) = watch::channel(state(PlaybackState::Idle));
        let mut watcher = StateWatcher::new(rx);
        drop(tx);

        assert!(watcher.changed().await.is_err());
        assert_eq!(watcher.current().playback_state, PlaybackState::Idle);
    }
}
