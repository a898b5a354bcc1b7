//! Background aggregation worker
//!
//! The worker thread is the only writer of a virtual device's state. State
//! notifications arrive on an mpsc channel from the platform listener, are
//! applied to the [`Aggregator`], and any resulting change is published to
//! the shared snapshot, the change iterator and the watch channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use parking_lot::RwLock;
use stack_model::StateNotification;
use tokio::sync::watch;

use crate::aggregator::{Aggregator, CompositeChange};
use crate::catalog::SourceCatalog;
use crate::composite::VirtualDeviceState;
use crate::resolver::Chain;

/// Messages consumed by the aggregation worker
#[derive(Debug)]
pub(crate) enum WorkerMessage {
    /// A device reported a new snapshot
    State(StateNotification),
    /// Barrier: acknowledged once every earlier message has been applied
    Flush(mpsc::Sender<()>),
    Shutdown,
}

/// Latest published result of the aggregation
#[derive(Debug, Clone)]
pub(crate) struct Published {
    pub chain: Chain,
    pub state: VirtualDeviceState,
    pub catalog: SourceCatalog,
}

impl Published {
    pub fn from_aggregator(aggregator: &Aggregator) -> Self {
        Self {
            chain: aggregator.chain().clone(),
            state: aggregator.state().clone(),
            catalog: aggregator.catalog().clone(),
        }
    }
}

/// Spawns the aggregation worker thread
///
/// This worker:
/// - Applies state notifications to the aggregator, in arrival order
/// - Publishes every resulting change under a single write lock
/// - Forwards changes to the change iterator once someone is listening
/// - Pushes the new composite to async watchers
pub(crate) fn spawn_aggregation_worker(
    mut aggregator: Aggregator,
    rx: mpsc::Receiver<WorkerMessage>,
    published: Arc<RwLock<Published>>,
    event_tx: mpsc::Sender<CompositeChange>,
    listening: Arc<AtomicBool>,
    watch_tx: watch::Sender<VirtualDeviceState>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        tracing::info!("Aggregation worker for '{}' started", aggregator.name());

        for message in rx.iter() {
            match message {
                WorkerMessage::State(notification) => {
                    let device = notification.device.clone();
                    let Some(change) = aggregator.apply(notification) else {
                        continue;
                    };

                    *published.write() = Published::from_aggregator(&aggregator);
                    tracing::debug!(
                        "Publishing '{}' after change on {}: {:?} from {}",
                        aggregator.name(),
                        device,
                        change.current.playback_state,
                        change.current.active_source_device
                    );

                    watch_tx.send_replace(change.current.clone());
                    if listening.load(Ordering::Acquire) {
                        let _ = event_tx.send(change);
                    }
                }
                WorkerMessage::Flush(ack) => {
                    let _ = ack.send(());
                }
                WorkerMessage::Shutdown => break,
            }
        }

        tracing::info!("Aggregation worker for '{}' stopped", aggregator.name());
    })
}
