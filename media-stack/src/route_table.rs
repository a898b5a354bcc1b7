//! Validated, immutable hub → source → device mapping

use std::collections::{HashMap, HashSet};

use stack_model::{DeviceId, DeviceStateSource};

use crate::config::StackConfig;
use crate::error::ConfigError;

/// A source label on a hub and the device it leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoute {
    pub label: String,
    pub device: DeviceId,
}

/// The static device graph of a virtual device
///
/// Built once from a [`StackConfig`]; there are no mutation operations. The
/// root is the first hub declared. Cycles are tolerated as a configuration
/// hazard: the resolver guards against them at runtime.
#[derive(Debug, Clone)]
pub struct RouteTable {
    root: DeviceId,
    hubs: Vec<(DeviceId, Vec<SourceRoute>)>,
    index: HashMap<DeviceId, usize>,
    devices: Vec<DeviceId>,
}

impl RouteTable {
    /// Build and validate a route table against the devices a platform knows
    pub fn from_config<S>(config: &StackConfig, platform: &S) -> Result<Self, ConfigError>
    where
        S: DeviceStateSource + ?Sized,
    {
        Self::from_config_with(config, |device| platform.is_known(device))
    }

    /// Build and validate a route table with a custom device check
    pub fn from_config_with<F>(config: &StackConfig, is_known: F) -> Result<Self, ConfigError>
    where
        F: Fn(&DeviceId) -> bool,
    {
        let root_hub = config.hubs.first().ok_or(ConfigError::NoHubs)?;
        if root_hub.sources.is_empty() {
            return Err(ConfigError::RootHasNoSources(root_hub.device.clone()));
        }

        let mut hubs = Vec::with_capacity(config.hubs.len());
        let mut index = HashMap::with_capacity(config.hubs.len());

        for hub in &config.hubs {
            if index.contains_key(&hub.device) {
                return Err(ConfigError::DuplicateHub(hub.device.clone()));
            }
            if !is_known(&hub.device) {
                return Err(ConfigError::UnresolvedDevice {
                    device: hub.device.clone(),
                    hub: hub.device.clone(),
                    label: None,
                });
            }

            let mut routes: Vec<SourceRoute> = Vec::with_capacity(hub.sources.len());
            for mapping in &hub.sources {
                if routes.iter().any(|route| route.label == mapping.label) {
                    return Err(ConfigError::DuplicateSourceLabel {
                        hub: hub.device.clone(),
                        label: mapping.label.clone(),
                    });
                }
                if !is_known(&mapping.device) {
                    return Err(ConfigError::UnresolvedDevice {
                        device: mapping.device.clone(),
                        hub: hub.device.clone(),
                        label: Some(mapping.label.clone()),
                    });
                }
                routes.push(SourceRoute {
                    label: mapping.label.clone(),
                    device: mapping.device.clone(),
                });
            }

            index.insert(hub.device.clone(), hubs.len());
            hubs.push((hub.device.clone(), routes));
        }

        let mut seen = HashSet::new();
        let mut devices = Vec::new();
        for (hub, routes) in &hubs {
            for device in std::iter::once(hub).chain(routes.iter().map(|r| &r.device)) {
                if seen.insert(device.clone()) {
                    devices.push(device.clone());
                }
            }
        }

        Ok(Self {
            root: root_hub.device.clone(),
            hubs,
            index,
            devices,
        })
    }

    /// The fixed entry point of every chain
    pub fn root(&self) -> &DeviceId {
        &self.root
    }

    pub fn is_hub(&self, device: &DeviceId) -> bool {
        self.index.contains_key(device)
    }

    /// Source routes of a hub in declaration order, `None` if not a hub
    pub fn children_of(&self, hub: &DeviceId) -> Option<&[SourceRoute]> {
        self.index
            .get(hub)
            .map(|&position| self.hubs[position].1.as_slice())
    }

    /// Device mapped to an exact source label on a hub
    pub fn child_for(&self, hub: &DeviceId, label: &str) -> Option<&DeviceId> {
        self.children_of(hub)?
            .iter()
            .find(|route| route.label == label)
            .map(|route| &route.device)
    }

    pub fn hub_count(&self) -> usize {
        self.hubs.len()
    }

    /// Every device in the table, root first, each once
    pub fn devices(&self) -> &[DeviceId] {
        &self.devices
    }

    pub fn contains(&self, device: &DeviceId) -> bool {
        self.devices.contains(device)
    }
}
