//! VirtualDevice - main entry point for media-stack
//!
//! A `VirtualDevice` presents a stack of source-switching devices as one
//! media player. It subscribes to every device in its route table, keeps the
//! composite state current on a background worker, and routes commands to
//! the root or the active leaf.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use parking_lot::{Mutex, RwLock};
use stack_model::{
    DeviceCommand, DeviceCommandSink, DeviceId, DevicePlatform, DeviceStateSource, StateListener,
    SubscriptionId,
};
use tokio::sync::watch;

use crate::aggregator::{Aggregator, CompositeChange};
use crate::catalog::{SourceCatalog, SourceEntry};
use crate::composite::VirtualDeviceState;
use crate::config::StackConfig;
use crate::error::{Result, StackError};
use crate::iter::ChangeIterator;
use crate::resolver::Chain;
use crate::route_table::RouteTable;
use crate::router::CommandRouter;
use crate::watcher::StateWatcher;
use crate::worker::{spawn_aggregation_worker, Published, WorkerMessage};

/// A stack of media devices presented as one
///
/// All methods are synchronous. State reads return the latest published
/// composite; call [`VirtualDevice::flush`] first to observe every
/// notification the platform has delivered so far.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use media_stack::{sim::SimulatedPlatform, StackConfig, VirtualDevice};
/// use stack_model::DeviceSnapshot;
///
/// let platform = Arc::new(
///     SimulatedPlatform::new()
///         .with_device("tv", DeviceSnapshot::available().with_source("HDMI 2"))
///         .with_device("stereo", DeviceSnapshot::available().with_source("PVR"))
///         .with_device("pvr", DeviceSnapshot::available()),
/// );
///
/// let config = StackConfig::builder("Lounge")
///     .hub("tv", [("HDMI 2", "stereo")])
///     .hub("stereo", [("PVR", "pvr")])
///     .build();
///
/// let device = VirtualDevice::new(config, platform)?;
/// assert_eq!(device.active_source_device().as_str(), "pvr");
///
/// device.set_volume(0.4)?;
/// # Ok::<(), media_stack::StackError>(())
/// ```
pub struct VirtualDevice {
    name: String,
    table: Arc<RouteTable>,
    state_source: Arc<dyn DeviceStateSource>,
    router: CommandRouter,
    published: Arc<RwLock<Published>>,
    worker_tx: mpsc::Sender<WorkerMessage>,
    event_rx: Arc<Mutex<mpsc::Receiver<CompositeChange>>>,
    listening: Arc<AtomicBool>,
    watch_rx: watch::Receiver<VirtualDeviceState>,
    subscriptions: Vec<SubscriptionId>,
    worker: Option<JoinHandle<()>>,
}

impl VirtualDevice {
    /// Create a virtual device on a platform offering state and commands
    pub fn new<P>(config: StackConfig, platform: Arc<P>) -> Result<Self>
    where
        P: DevicePlatform + 'static,
    {
        let state_source: Arc<dyn DeviceStateSource> = platform.clone();
        let sink: Arc<dyn DeviceCommandSink> = platform;
        Self::with_parts(config, state_source, sink)
    }

    /// Create a virtual device from a JSON configuration file
    pub fn from_config_file<P>(path: impl AsRef<Path>, platform: Arc<P>) -> Result<Self>
    where
        P: DevicePlatform + 'static,
    {
        Self::new(StackConfig::from_file(path)?, platform)
    }

    /// Create a virtual device from separate state and command collaborators
    ///
    /// Validates the configuration, subscribes to every device in it, loads
    /// the initial snapshots and starts the aggregation worker. If any
    /// subscription fails the ones already made are released.
    pub fn with_parts(
        config: StackConfig,
        state_source: Arc<dyn DeviceStateSource>,
        sink: Arc<dyn DeviceCommandSink>,
    ) -> Result<Self> {
        let table = Arc::new(RouteTable::from_config(&config, state_source.as_ref())?);
        let (worker_tx, worker_rx) = mpsc::channel();

        let subscriptions = subscribe_all(&table, state_source.as_ref(), &worker_tx)?;

        let mut aggregator = Aggregator::new(config.name.clone(), Arc::clone(&table));
        aggregator.seed(state_source.as_ref());

        let published = Arc::new(RwLock::new(Published::from_aggregator(&aggregator)));
        let (watch_tx, watch_rx) = watch::channel(aggregator.state().clone());
        let (event_tx, event_rx) = mpsc::channel();
        let listening = Arc::new(AtomicBool::new(false));

        let worker = spawn_aggregation_worker(
            aggregator,
            worker_rx,
            Arc::clone(&published),
            event_tx,
            Arc::clone(&listening),
            watch_tx,
        );

        let router = CommandRouter::new(table.root().clone(), Arc::clone(&published), sink);

        tracing::info!(
            "Created virtual device '{}' over {} devices ({} hubs), root {}",
            config.name,
            table.devices().len(),
            table.hub_count(),
            table.root()
        );

        Ok(Self {
            name: config.name,
            table,
            state_source,
            router,
            published,
            worker_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            listening,
            watch_rx,
            subscriptions,
            worker: Some(worker),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn route_table(&self) -> &RouteTable {
        &self.table
    }

    /// Latest published composite state
    pub fn state(&self) -> VirtualDeviceState {
        self.published.read().state.clone()
    }

    /// Latest published chain
    pub fn chain(&self) -> Chain {
        self.published.read().chain.clone()
    }

    /// Leaf of the latest published chain
    pub fn active_source_device(&self) -> DeviceId {
        self.published.read().chain.leaf().clone()
    }

    /// Name of the active source, if one can be determined
    pub fn source(&self) -> Option<String> {
        self.published.read().state.source.clone()
    }

    /// Names of every selectable source, sorted
    pub fn source_list(&self) -> Vec<String> {
        self.published.read().state.source_list.clone()
    }

    pub fn catalog(&self) -> SourceCatalog {
        self.published.read().catalog.clone()
    }

    /// Blocking iterator over composite changes
    ///
    /// Changes are queued from the first call on; earlier ones are not
    /// retained.
    pub fn iter(&self) -> ChangeIterator {
        self.listening.store(true, Ordering::Release);
        ChangeIterator::new(Arc::clone(&self.event_rx))
    }

    /// Async watcher over the composite state
    pub fn watch(&self) -> StateWatcher {
        StateWatcher::new(self.watch_rx.clone())
    }

    /// Wait until every notification delivered so far has been applied
    pub fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = mpsc::channel();
        self.worker_tx
            .send(WorkerMessage::Flush(ack_tx))
            .map_err(|_| StackError::WorkerStopped)?;
        ack_rx.recv().map_err(|_| StackError::WorkerStopped)
    }

    /// Device a command would be sent to right now
    pub fn target_for(&self, command: &DeviceCommand) -> DeviceId {
        self.router.target_for(command)
    }

    /// Route and send a command
    pub fn dispatch(&self, command: DeviceCommand) -> Result<()> {
        Ok(self.router.dispatch(command)?)
    }

    pub fn play(&self) -> Result<()> {
        self.dispatch(DeviceCommand::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.dispatch(DeviceCommand::Pause)
    }

    pub fn play_pause(&self) -> Result<()> {
        self.dispatch(DeviceCommand::PlayPause)
    }

    pub fn stop(&self) -> Result<()> {
        self.dispatch(DeviceCommand::Stop)
    }

    pub fn next_track(&self) -> Result<()> {
        self.dispatch(DeviceCommand::NextTrack)
    }

    pub fn previous_track(&self) -> Result<()> {
        self.dispatch(DeviceCommand::PreviousTrack)
    }

    /// Seek the active source to a position in seconds
    pub fn seek(&self, position_secs: f64) -> Result<()> {
        self.dispatch(DeviceCommand::Seek(position_secs))
    }

    /// Set the root's volume, clamped to 0.0..=1.0
    pub fn set_volume(&self, level: f32) -> Result<()> {
        self.dispatch(DeviceCommand::SetVolume(level))
    }

    pub fn volume_up(&self) -> Result<()> {
        self.dispatch(DeviceCommand::VolumeUp)
    }

    pub fn volume_down(&self) -> Result<()> {
        self.dispatch(DeviceCommand::VolumeDown)
    }

    pub fn set_mute(&self, muted: bool) -> Result<()> {
        self.dispatch(DeviceCommand::SetMute(muted))
    }

    pub fn turn_on(&self) -> Result<()> {
        self.dispatch(DeviceCommand::TurnOn)
    }

    pub fn turn_off(&self) -> Result<()> {
        self.dispatch(DeviceCommand::TurnOff)
    }

    pub fn clear_playlist(&self) -> Result<()> {
        self.dispatch(DeviceCommand::ClearPlaylist)
    }

    pub fn set_shuffle(&self, shuffle: bool) -> Result<()> {
        self.dispatch(DeviceCommand::SetShuffle(shuffle))
    }

    /// Select a source by its name in the source list
    ///
    /// Every hub on the way to the source is switched, root first. A hub
    /// that is off is turned on before its source is selected, and a hub
    /// already on the right source is left alone. A source that is a whole
    /// device is turned on when it is off.
    pub fn select_source(&self, name: &str) -> Result<()> {
        let entry = self
            .published
            .read()
            .catalog
            .find(name)
            .cloned()
            .ok_or_else(|| StackError::SourceNotFound(name.to_string()))?;

        tracing::debug!(
            "Selecting '{}' on '{}' through {} hubs",
            name,
            self.name,
            entry.path.len()
        );
        self.switch_to(&entry)
    }

    /// Play media on a specific device of the stack
    ///
    /// The stack is first switched to the device as with
    /// [`VirtualDevice::select_source`], then the media is sent to that
    /// device, whatever the chain resolves to afterwards.
    pub fn play_media(
        &self,
        device: &DeviceId,
        media_type: impl Into<String>,
        media_id: impl Into<String>,
    ) -> Result<()> {
        let entry = self
            .published
            .read()
            .catalog
            .find_device(device)
            .cloned()
            .ok_or_else(|| StackError::DeviceNotInStack(device.clone()))?;

        self.switch_to(&entry)?;
        self.router.send_to(
            device,
            DeviceCommand::PlayMedia {
                media_type: media_type.into(),
                media_id: media_id.into(),
            },
        )?;
        Ok(())
    }

    fn switch_to(&self, entry: &SourceEntry) -> Result<()> {
        for selection in &entry.path {
            let current = self.state_source.snapshot(&selection.device);
            if current.playback_state.is_off() {
                self.router.send_to(&selection.device, DeviceCommand::TurnOn)?;
            }
            if current.selected_source.as_deref() != Some(selection.label.as_str()) {
                self.router.send_to(
                    &selection.device,
                    DeviceCommand::SelectSource(selection.label.clone()),
                )?;
            }
        }

        let switched = entry.path.iter().any(|s| s.device == entry.device);
        if !switched && self.state_source.snapshot(&entry.device).playback_state.is_off() {
            self.router.send_to(&entry.device, DeviceCommand::TurnOn)?;
        }
        Ok(())
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        tracing::debug!(
            "VirtualDevice '{}' dropping, releasing {} subscriptions",
            self.name,
            self.subscriptions.len()
        );

        for subscription in self.subscriptions.drain(..) {
            self.state_source.unsubscribe(subscription);
        }
        let _ = self.worker_tx.send(WorkerMessage::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("Aggregation worker for '{}' panicked", self.name);
            }
        }
    }
}

/// Subscribe a forwarding listener to every device in the table
fn subscribe_all(
    table: &RouteTable,
    source: &dyn DeviceStateSource,
    worker_tx: &mpsc::Sender<WorkerMessage>,
) -> Result<Vec<SubscriptionId>> {
    let mut subscriptions = Vec::with_capacity(table.devices().len());

    for device in table.devices() {
        let tx = worker_tx.clone();
        let listener: StateListener = Arc::new(move |notification| {
            let _ = tx.send(WorkerMessage::State(notification));
        });

        match source.subscribe(device, listener) {
            Ok(id) => subscriptions.push(id),
            Err(e) => {
                tracing::warn!("Failed to subscribe to {}: {}", device, e);
                for id in subscriptions {
                    source.unsubscribe(id);
                }
                return Err(e.into());
            }
        }
    }

    Ok(subscriptions)
}
