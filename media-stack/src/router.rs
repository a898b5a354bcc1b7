//! Command routing to the root or the active leaf
//!
//! | Class    | Target |
//! |----------|--------|
//! | Volume   | root   |
//! | Power    | root   |
//! | Source   | root   |
//! | Playback | leaf of the latest published chain |

use std::sync::Arc;

use parking_lot::RwLock;
use stack_model::{CommandClass, CommandError, DeviceCommand, DeviceCommandSink, DeviceId};

use crate::resolver::Chain;
use crate::worker::Published;

/// Dispatches commands issued on a virtual device
pub struct CommandRouter {
    root: DeviceId,
    published: Arc<RwLock<Published>>,
    sink: Arc<dyn DeviceCommandSink>,
}

impl CommandRouter {
    pub(crate) fn new(
        root: DeviceId,
        published: Arc<RwLock<Published>>,
        sink: Arc<dyn DeviceCommandSink>,
    ) -> Self {
        Self {
            root,
            published,
            sink,
        }
    }

    /// Device a command would be sent to right now
    pub fn target_for(&self, command: &DeviceCommand) -> DeviceId {
        match command.class() {
            CommandClass::Playback => self.published.read().chain.leaf().clone(),
            CommandClass::Volume | CommandClass::Power | CommandClass::Source => {
                self.root.clone()
            }
        }
    }

    /// Send a command to its target
    ///
    /// The sink's result is returned as is. Playback commands go to the leaf
    /// even while it is unavailable.
    pub fn dispatch(&self, command: DeviceCommand) -> Result<(), CommandError> {
        let command = match command {
            DeviceCommand::SetVolume(level) => DeviceCommand::SetVolume(level.clamp(0.0, 1.0)),
            other => other,
        };
        let target = self.target_for(&command);
        self.send_to(&target, command)
    }

    /// Send a command to a specific device, bypassing routing
    pub(crate) fn send_to(
        &self,
        device: &DeviceId,
        command: DeviceCommand,
    ) -> Result<(), CommandError> {
        let name = command.name();
        tracing::debug!("Sending {} to {}", name, device);

        self.sink.send(device, command).map_err(|e| {
            tracing::warn!("Command {} to {} failed: {}", name, device, e);
            e
        })
    }
}

/// Target of a command for a given chain
///
/// Pure form of [`CommandRouter::target_for`].
pub fn route<'a>(command: &DeviceCommand, chain: &'a Chain) -> &'a DeviceId {
    match command.class() {
        CommandClass::Playback => chain.leaf(),
        CommandClass::Volume | CommandClass::Power | CommandClass::Source => chain.root(),
    }
}
