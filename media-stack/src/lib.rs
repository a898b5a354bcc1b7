//! Media Stack
//!
//! Compose a tree of source-switching media devices into one virtual device.
//!
//! A TV whose HDMI input feeds from a stereo, whose PVR input feeds from a
//! set-top box, is one logical player: volume belongs to the TV, playback
//! belongs to whatever is at the end of the currently selected inputs.
//!
//! # Architecture
//!
//! ```text
//! Platform notifications → worker → Aggregator ─┬→ published state (RwLock)
//!                                  (cache,      ├→ ChangeIterator (blocking)
//!                                   resolve,    └→ StateWatcher (async)
//!                                   derive)
//!
//! VirtualDevice::play() → CommandRouter → leaf of the latest chain
//! VirtualDevice::set_volume() → CommandRouter → root
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use media_stack::{StackConfig, VirtualDevice};
//!
//! let config = StackConfig::from_file("lounge.json")?;
//! let device = VirtualDevice::new(config, platform)?;
//!
//! println!("Playing from {}", device.active_source_device());
//! device.play()?;
//!
//! for change in device.iter() {
//!     println!("{:?}", change.current.playback_state);
//! }
//! ```
//!
//! # Async Usage
//!
//! ```rust,ignore
//! let mut watcher = device.watch();
//! while let Ok(state) = watcher.changed().await {
//!     println!("Source: {:?}", state.source);
//! }
//! ```

// Core modules
pub mod aggregator;
pub mod cache;
pub mod catalog;
pub mod composite;
pub mod config;
pub mod resolver;
pub mod route_table;
pub mod router;

// Facade and publication
pub mod iter;
pub mod virtual_device;
pub mod watcher;
mod worker;

// In-memory platform for tests and demos
pub mod sim;

// Error types
pub mod error;

// Logging infrastructure
pub mod logging;

// ============================================================================
// Re-exports
// ============================================================================

pub use aggregator::{Aggregator, CompositeChange};
pub use cache::{SnapshotCache, SnapshotView};
pub use catalog::{SourceCatalog, SourceEntry, SourceSelection};
pub use composite::VirtualDeviceState;
pub use config::{HubConfig, SourceMapping, StackConfig, StackConfigBuilder};
pub use iter::ChangeIterator;
pub use resolver::{resolve, Chain, Termination};
pub use route_table::{RouteTable, SourceRoute};
pub use router::{route, CommandRouter};
pub use virtual_device::VirtualDevice;
pub use watcher::StateWatcher;

pub use error::{ConfigError, Result, StackError};

pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::composite::VirtualDeviceState;
    pub use crate::config::StackConfig;
    pub use crate::error::{Result, StackError};
    pub use crate::resolver::{Chain, Termination};
    pub use crate::virtual_device::VirtualDevice;
    pub use stack_model::{
        DeviceCommand, DeviceCommandSink, DeviceId, DevicePlatform, DeviceSnapshot,
        DeviceStateSource, FeatureSet, PlaybackState,
    };
}
