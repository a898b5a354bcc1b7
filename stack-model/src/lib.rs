//! Media Stack Model
//!
//! Shared vocabulary between the media-stack core and the host device
//! platform: device identity, state snapshots, commands and the narrow
//! capability traits the platform implements.
//!
//! # Example
//!
//! ```rust
//! use stack_model::{DeviceCommand, DeviceId, DeviceSnapshot, PlaybackState};
//!
//! let tv = DeviceId::new("media_player.tv");
//! let snapshot = DeviceSnapshot::available()
//!     .with_name("TV")
//!     .with_source("HDMI 2")
//!     .with_playback_state(PlaybackState::Playing);
//!
//! assert_eq!(snapshot.display_name(&tv), "TV");
//! assert_eq!(DeviceCommand::Play.name(), "play");
//! ```

pub mod command;
pub mod device;
pub mod device_id;
pub mod error;
pub mod features;
pub mod metadata;
pub mod playback_state;
pub mod snapshot;

pub use command::{CommandClass, DeviceCommand};
pub use device::{
    DeviceCommandSink, DevicePlatform, DeviceStateSource, StateListener, SubscriptionId,
};
pub use device_id::DeviceId;
pub use error::{CommandError, DeviceError};
pub use features::FeatureSet;
pub use metadata::MediaMetadata;
pub use playback_state::PlaybackState;
pub use snapshot::{DeviceSnapshot, StateNotification};
