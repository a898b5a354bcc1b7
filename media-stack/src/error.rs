//! Error types for media-stack

use std::path::PathBuf;

use stack_model::{CommandError, DeviceError, DeviceId};
use thiserror::Error;

/// Result type for media-stack operations
pub type Result<T> = std::result::Result<T, StackError>;

/// Fatal problems with the static configuration
///
/// These are raised while the route table is built. The virtual device is
/// never created from a configuration that fails validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration declares no hubs, so there is no root device
    #[error("No hubs declared; the first hub declared is the root device")]
    NoHubs,

    /// The root hub has an empty source mapping
    #[error("Root device {0} must map at least one source")]
    RootHasNoSources(DeviceId),

    /// The same hub is declared twice
    #[error("Hub {0} is declared more than once")]
    DuplicateHub(DeviceId),

    /// A source label appears twice under one hub
    #[error("Hub {hub} maps source {label:?} more than once")]
    DuplicateSourceLabel { hub: DeviceId, label: String },

    /// A hub or mapped child is not known to the device platform
    #[error(
        "Device {device} (declared under hub {hub}{}) is not known to the platform",
        .label.as_ref().map(|l| format!(", source {:?}", l)).unwrap_or_default()
    )]
    UnresolvedDevice {
        device: DeviceId,
        hub: DeviceId,
        label: Option<String>,
    },

    /// Configuration text is not valid
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("Failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by [`VirtualDevice`](crate::VirtualDevice)
#[derive(Error, Debug)]
pub enum StackError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A forwarded command failed at the device layer
    #[error("Command dispatch failed: {0}")]
    Command(#[from] CommandError),

    #[error("Device platform error: {0}")]
    Device(#[from] DeviceError),

    /// No entry in the source list has this name
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// The device offers no source reachable from the root
    #[error("Device {0} is not reachable in the source chain")]
    DeviceNotInStack(DeviceId),

    /// The aggregation worker is no longer running
    #[error("Aggregation worker has stopped")]
    WorkerStopped,
}
