//! Last-known state of a single device

use serde::{Deserialize, Serialize};

use crate::{DeviceId, FeatureSet, MediaMetadata, PlaybackState};

/// Snapshot of a device's remote state as last reported by the platform
///
/// The core never mutates a device through its snapshot. Changes happen by
/// issuing commands and observing the next snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Whether the device is reachable
    pub available: bool,
    /// Human readable name, used for source labels
    pub friendly_name: Option<String>,
    /// Source label the device currently reports as selected
    pub selected_source: Option<String>,
    /// Sources the device offers
    #[serde(default)]
    pub source_list: Vec<String>,
    pub playback_state: PlaybackState,
    pub media_metadata: Option<MediaMetadata>,
    /// Volume level (0.0..=1.0)
    pub volume_level: Option<f32>,
    pub is_muted: Option<bool>,
    pub shuffle: Option<bool>,
    /// Operations the device advertises
    #[serde(default)]
    pub supported_features: FeatureSet,
}

impl DeviceSnapshot {
    /// Snapshot for a device that is unreachable or has never reported
    pub fn unavailable() -> Self {
        Self {
            available: false,
            playback_state: PlaybackState::Unknown,
            ..Default::default()
        }
    }

    /// Snapshot for a reachable, idle device
    pub fn available() -> Self {
        Self {
            available: true,
            playback_state: PlaybackState::Idle,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.selected_source = Some(source.into());
        self
    }

    pub fn with_source_list<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_list = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_playback_state(mut self, state: PlaybackState) -> Self {
        self.playback_state = state;
        self
    }

    pub fn with_metadata(mut self, metadata: MediaMetadata) -> Self {
        self.media_metadata = Some(metadata);
        self
    }

    pub fn with_volume(mut self, level: f32) -> Self {
        self.volume_level = Some(level);
        self
    }

    pub fn with_muted(mut self, muted: bool) -> Self {
        self.is_muted = Some(muted);
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = Some(shuffle);
        self
    }

    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.supported_features = features;
        self
    }

    /// Name to show for this device, falling back to its id
    pub fn display_name<'a>(&'a self, id: &'a DeviceId) -> &'a str {
        self.friendly_name.as_deref().unwrap_or(id.as_str())
    }

    /// Sources offered by the device, including the selected one when the
    /// device reports it without listing it
    pub fn sources(&self) -> Vec<String> {
        let mut sources = self.source_list.clone();
        if let Some(current) = &self.selected_source {
            if !sources.contains(current) {
                sources.push(current.clone());
            }
        }
        sources
    }
}

/// A new snapshot delivered by the platform for one device
#[derive(Debug, Clone, PartialEq)]
pub struct StateNotification {
    pub device: DeviceId,
    pub snapshot: DeviceSnapshot,
}

impl StateNotification {
    pub fn new(device: impl Into<DeviceId>, snapshot: DeviceSnapshot) -> Self {
        Self {
            device: device.into(),
            snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_defaults() {
        let snap = DeviceSnapshot::unavailable();
        assert!(!snap.available);
        assert_eq!(snap.playback_state, PlaybackState::Unknown);
        assert!(snap.selected_source.is_none());
        assert!(snap.volume_level.is_none());
    }

    #[test]
    fn test_sources_appends_unlisted_selection() {
        let snap = DeviceSnapshot::available()
            .with_source_list(["HDMI 1", "HDMI 2"])
            .with_source("Channels");
        assert_eq!(snap.sources(), vec!["HDMI 1", "HDMI 2", "Channels"]);
    }

    #[test]
    fn test_sources_does_not_duplicate_listed_selection() {
        let snap = DeviceSnapshot::available()
            .with_source_list(["HDMI 1", "HDMI 2"])
            .with_source("HDMI 2");
        assert_eq!(snap.sources(), vec!["HDMI 1", "HDMI 2"]);
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let id = DeviceId::new("media_player.tv");
        assert_eq!(DeviceSnapshot::available().display_name(&id), "media_player.tv");
        assert_eq!(
            DeviceSnapshot::available().with_name("TV").display_name(&id),
            "TV"
        );
    }
}
