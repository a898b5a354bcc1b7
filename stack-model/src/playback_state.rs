//! Playback state enumeration

use serde::{Deserialize, Serialize};

/// Current playback state of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Powered and ready, nothing loaded or playing
    Idle,
    /// Currently playing media
    Playing,
    /// Playback is paused
    Paused,
    /// Loading or waiting for data
    Buffering,
    /// Powered off or in standby
    Off,
    /// State could not be determined
    #[default]
    Unknown,
}

impl PlaybackState {
    /// Parse from a host platform state string
    ///
    /// Handles values like:
    /// - "playing", "paused", "idle", "buffering"
    /// - "off" and "standby" (both map to `Off`)
    ///
    /// Anything else, including "unavailable", is `Unknown`.
    pub fn from_state_str(state: &str) -> Self {
        match state.to_ascii_lowercase().as_str() {
            "playing" => PlaybackState::Playing,
            "paused" => PlaybackState::Paused,
            "idle" | "on" => PlaybackState::Idle,
            "buffering" => PlaybackState::Buffering,
            "off" | "standby" => PlaybackState::Off,
            _ => PlaybackState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Buffering => "buffering",
            PlaybackState::Off => "off",
            PlaybackState::Unknown => "unknown",
        }
    }

    pub fn is_off(&self) -> bool {
        matches!(self, PlaybackState::Off)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
