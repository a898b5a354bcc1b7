//! Aggregation engine: snapshots in, composite state out
//!
//! The aggregator is the single-threaded core of a virtual device. Every
//! notification updates the snapshot cache, then the chain and composite are
//! recomputed from scratch. The catalogue is rebuilt only when a field it
//! reads changed. A [`CompositeChange`] is produced only when the result is
//! observably different.

use std::sync::Arc;
use std::time::Instant;

use stack_model::{DeviceStateSource, StateNotification};

use crate::cache::SnapshotCache;
use crate::catalog::{affects_catalog, SourceCatalog};
use crate::composite::VirtualDeviceState;
use crate::resolver::{resolve, Chain, Termination};
use crate::route_table::RouteTable;

/// A published change of the composite state
#[derive(Debug, Clone)]
pub struct CompositeChange {
    pub previous: VirtualDeviceState,
    pub current: VirtualDeviceState,
    /// The leaf moved to a different device
    pub leaf_changed: bool,
    /// When the change was computed
    pub timestamp: Instant,
}

impl PartialEq for CompositeChange {
    fn eq(&self, other: &Self) -> bool {
        // Timestamp not included in equality
        self.previous == other.previous
            && self.current == other.current
            && self.leaf_changed == other.leaf_changed
    }
}

/// Single-writer aggregation state of one virtual device
#[derive(Debug)]
pub struct Aggregator {
    name: String,
    table: Arc<RouteTable>,
    cache: SnapshotCache,
    chain: Chain,
    catalog: SourceCatalog,
    state: VirtualDeviceState,
}

impl Aggregator {
    /// Create an aggregator with no known snapshots
    ///
    /// Every device is treated as unavailable until it reports or
    /// [`Aggregator::seed`] is called.
    pub fn new(name: impl Into<String>, table: Arc<RouteTable>) -> Self {
        let name = name.into();
        let cache = SnapshotCache::new();
        let chain = resolve(&table, &cache);
        let catalog = SourceCatalog::build(&table, &cache);
        let state = VirtualDeviceState::derive(&name, &table, &chain, &cache, &catalog);
        Self {
            name,
            table,
            cache,
            chain,
            catalog,
            state,
        }
    }

    /// Load the current snapshot of every device in the route table
    pub fn seed<S>(&mut self, source: &S)
    where
        S: DeviceStateSource + ?Sized,
    {
        for device in self.table.devices() {
            self.cache.set(device.clone(), source.snapshot(device));
        }
        self.recompute();
        tracing::debug!(
            "Seeded {} snapshots for '{}', chain {:?}",
            self.cache.len(),
            self.name,
            self.chain.devices()
        );
    }

    /// Apply one state notification
    ///
    /// Returns the change to publish, or `None` when neither the composite
    /// nor the leaf changed. Notifications for devices outside the route
    /// table are ignored.
    pub fn apply(&mut self, notification: StateNotification) -> Option<CompositeChange> {
        let StateNotification { device, snapshot } = notification;
        if !self.table.contains(&device) {
            tracing::trace!("Ignoring notification for unrelated device {}", device);
            return None;
        }

        let rebuild_catalog = affects_catalog(self.cache.get(&device), &snapshot);
        self.cache.set(device, snapshot);
        self.update(rebuild_catalog)
    }

    /// Re-resolve and re-derive everything from the cached snapshots
    pub fn recompute(&mut self) -> Option<CompositeChange> {
        self.update(true)
    }

    fn update(&mut self, rebuild_catalog: bool) -> Option<CompositeChange> {
        let chain = resolve(&self.table, &self.cache);
        tracing::trace!(
            "Resolved chain {:?} ({:?})",
            chain.devices(),
            chain.termination()
        );

        match chain.termination() {
            Termination::Cycle { revisited } => tracing::warn!(
                "Source cycle in '{}': {} leads back to {}",
                self.name,
                chain.leaf(),
                revisited
            ),
            Termination::DepthLimit => tracing::warn!(
                "Chain for '{}' hit the depth limit of {} hubs",
                self.name,
                self.table.hub_count()
            ),
            _ => {}
        }

        if rebuild_catalog {
            self.catalog = SourceCatalog::build(&self.table, &self.cache);
        }
        let state = VirtualDeviceState::derive(
            &self.name,
            &self.table,
            &chain,
            &self.cache,
            &self.catalog,
        );

        let leaf_changed = chain.leaf() != self.chain.leaf();
        if leaf_changed {
            tracing::debug!(
                "Active source of '{}' moved from {} to {}",
                self.name,
                self.chain.leaf(),
                chain.leaf()
            );
        }

        let changed = leaf_changed || state != self.state;
        self.chain = chain;

        if !changed {
            return None;
        }

        let previous = std::mem::replace(&mut self.state, state);
        Some(CompositeChange {
            previous,
            current: self.state.clone(),
            leaf_changed,
            timestamp: Instant::now(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &VirtualDeviceState {
        &self.state
    }

    pub fn snapshots(&self) -> &SnapshotCache {
        &self.cache
    }
}
