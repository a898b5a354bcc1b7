//! Error types reported by device collaborators

use thiserror::Error;

use crate::DeviceId;

/// Failure reported by a [`DeviceCommandSink`](crate::DeviceCommandSink)
///
/// The core forwards these unchanged to its caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The device refused the command
    #[error("Device {device} rejected {command}: {reason}")]
    Rejected {
        device: DeviceId,
        command: &'static str,
        reason: String,
    },

    /// The device could not be reached
    #[error("Device {0} is unreachable")]
    Unreachable(DeviceId),

    /// The device does not support the command
    #[error("Device {device} does not support {command}")]
    Unsupported {
        device: DeviceId,
        command: &'static str,
    },

    /// Any other platform failure
    #[error("Command failed: {0}")]
    Failed(String),
}

/// Failure reported by a [`DeviceStateSource`](crate::DeviceStateSource)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// The platform does not know the device
    #[error("Device not found: {0}")]
    NotFound(DeviceId),

    /// Subscribing to state changes failed
    #[error("Subscription to {device} failed: {reason}")]
    SubscriptionFailed { device: DeviceId, reason: String },
}
