//! Static configuration for a virtual device
//!
//! A configuration names the virtual device and declares its hubs in order.
//! The first hub declared is the root. In JSON the mapping keeps the shape
//! hosts already use for media stacks:
//!
//! ```json
//! {
//!   "name": "Lounge",
//!   "mapping": {
//!     "media_player.tv": { "HDMI 1": "media_player.lounge_room", "HDMI 2": "media_player.stereo" },
//!     "media_player.stereo": { "PVR": "media_player.bedroom" }
//!   }
//! }
//! ```
//!
//! Both map levels are read in document order and duplicate keys are kept,
//! so the route table can reject them instead of silently keeping the last.

use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stack_model::DeviceId;

use crate::error::ConfigError;

/// Configuration of one virtual device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Name of the virtual device
    pub name: String,

    /// Hub declarations in order; the first is the root
    #[serde(rename = "mapping", with = "ordered_hubs")]
    pub hubs: Vec<HubConfig>,
}

/// One hub: a device whose sources can lead to other devices
#[derive(Debug, Clone, PartialEq)]
pub struct HubConfig {
    pub device: DeviceId,
    pub sources: Vec<SourceMapping>,
}

/// A source label on a hub and the device it leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMapping {
    pub label: String,
    pub device: DeviceId,
}

impl StackConfig {
    pub fn builder(name: impl Into<String>) -> StackConfigBuilder {
        StackConfigBuilder {
            name: name.into(),
            hubs: Vec::new(),
        }
    }

    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The first declared hub, if any
    pub fn root(&self) -> Option<&DeviceId> {
        self.hubs.first().map(|hub| &hub.device)
    }
}

/// Builder for [`StackConfig`]
///
/// # Example
///
/// ```rust
/// use media_stack::StackConfig;
///
/// let config = StackConfig::builder("Lounge")
///     .hub("tv", [("HDMI 1", "lounge_room"), ("HDMI 2", "stereo")])
///     .hub("stereo", [("PVR", "bedroom")])
///     .build();
///
/// assert_eq!(config.root().map(|id| id.as_str()), Some("tv"));
/// ```
#[derive(Debug, Clone)]
pub struct StackConfigBuilder {
    name: String,
    hubs: Vec<HubConfig>,
}

impl StackConfigBuilder {
    /// Declare a hub with its source mapping, in order
    pub fn hub<I, L, D>(mut self, device: impl Into<DeviceId>, sources: I) -> Self
    where
        I: IntoIterator<Item = (L, D)>,
        L: Into<String>,
        D: Into<DeviceId>,
    {
        self.hubs.push(HubConfig {
            device: device.into(),
            sources: sources
                .into_iter()
                .map(|(label, device)| SourceMapping {
                    label: label.into(),
                    device: device.into(),
                })
                .collect(),
        });
        self
    }

    pub fn build(self) -> StackConfig {
        StackConfig {
            name: self.name,
            hubs: self.hubs,
        }
    }
}

/// Order-preserving map of source label to device id
struct Sources(Vec<SourceMapping>);

impl Serialize for Sources {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for mapping in &self.0 {
            map.serialize_entry(&mapping.label, &mapping.device)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Sources {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SourcesVisitor;

        impl<'de> Visitor<'de> for SourcesVisitor {
            type Value = Sources;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of source label to device id")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Sources, A::Error> {
                let mut sources = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, device)) = access.next_entry::<String, DeviceId>()? {
                    sources.push(SourceMapping { label, device });
                }
                Ok(Sources(sources))
            }
        }

        deserializer.deserialize_map(SourcesVisitor)
    }
}

mod ordered_hubs {
    use super::*;

    pub(super) fn serialize<S: Serializer>(
        hubs: &[HubConfig],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(hubs.len()))?;
        for hub in hubs {
            map.serialize_entry(&hub.device, &Sources(hub.sources.clone()))?;
        }
        map.end()
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<HubConfig>, D::Error> {
        struct HubsVisitor;

        impl<'de> Visitor<'de> for HubsVisitor {
            type Value = Vec<HubConfig>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of hub device id to its source mapping")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut hubs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((device, Sources(sources))) =
                    access.next_entry::<DeviceId, Sources>()?
                {
                    hubs.push(HubConfig { device, sources });
                }
                Ok(hubs)
            }
        }

        deserializer.deserialize_map(HubsVisitor)
    }
}
