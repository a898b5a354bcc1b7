//! Commands the core can issue to a device

use serde::{Deserialize, Serialize};
use std::fmt;

/// Routing class of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandClass {
    /// Volume level and mute
    Volume,
    /// Transport control of the active content
    Playback,
    /// Power on/off
    Power,
    /// Input selection
    Source,
}

/// A command addressed to a single device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum DeviceCommand {
    /// Set volume level (0.0..=1.0)
    SetVolume(f32),
    VolumeUp,
    VolumeDown,
    SetMute(bool),
    Play,
    Pause,
    PlayPause,
    Stop,
    NextTrack,
    PreviousTrack,
    /// Seek to a position in seconds
    Seek(f64),
    ClearPlaylist,
    SetShuffle(bool),
    /// Play a media item identified by the device's own content id
    PlayMedia { media_type: String, media_id: String },
    TurnOn,
    TurnOff,
    /// Select an input by its exact label
    SelectSource(String),
}

impl DeviceCommand {
    pub fn class(&self) -> CommandClass {
        match self {
            DeviceCommand::SetVolume(_)
            | DeviceCommand::VolumeUp
            | DeviceCommand::VolumeDown
            | DeviceCommand::SetMute(_) => CommandClass::Volume,
            DeviceCommand::Play
            | DeviceCommand::Pause
            | DeviceCommand::PlayPause
            | DeviceCommand::Stop
            | DeviceCommand::NextTrack
            | DeviceCommand::PreviousTrack
            | DeviceCommand::Seek(_)
            | DeviceCommand::ClearPlaylist
            | DeviceCommand::SetShuffle(_)
            | DeviceCommand::PlayMedia { .. } => CommandClass::Playback,
            DeviceCommand::TurnOn | DeviceCommand::TurnOff => CommandClass::Power,
            DeviceCommand::SelectSource(_) => CommandClass::Source,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeviceCommand::SetVolume(_) => "set_volume",
            DeviceCommand::VolumeUp => "volume_up",
            DeviceCommand::VolumeDown => "volume_down",
            DeviceCommand::SetMute(_) => "set_mute",
            DeviceCommand::Play => "play",
            DeviceCommand::Pause => "pause",
            DeviceCommand::PlayPause => "play_pause",
            DeviceCommand::Stop => "stop",
            DeviceCommand::NextTrack => "next_track",
            DeviceCommand::PreviousTrack => "previous_track",
            DeviceCommand::Seek(_) => "seek",
            DeviceCommand::ClearPlaylist => "clear_playlist",
            DeviceCommand::SetShuffle(_) => "set_shuffle",
            DeviceCommand::PlayMedia { .. } => "play_media",
            DeviceCommand::TurnOn => "turn_on",
            DeviceCommand::TurnOff => "turn_off",
            DeviceCommand::SelectSource(_) => "select_source",
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceCommand::SetVolume(level) => write!(f, "set_volume({})", level),
            DeviceCommand::SetMute(muted) => write!(f, "set_mute({})", muted),
            DeviceCommand::Seek(position) => write!(f, "seek({})", position),
            DeviceCommand::SetShuffle(shuffle) => write!(f, "set_shuffle({})", shuffle),
            DeviceCommand::PlayMedia {
                media_type,
                media_id,
            } => write!(f, "play_media({}, {:?})", media_type, media_id),
            DeviceCommand::SelectSource(label) => write!(f, "select_source({:?})", label),
            other => f.write_str(other.name()),
        }
    }
}
