//! Catalogue of every source reachable from the root
//!
//! Each entry is one selectable end point of the stack, named after the
//! device that offers it and the label on that device, together with the
//! hub selections that lead to it:
//!
//! ```text
//! TV: HDMI 1            [(TV, HDMI 1)]
//! Stereo: PVR           [(TV, HDMI 2), (Stereo, PVR)]
//! Stereo: AUX           [(TV, HDMI 2), (Stereo, AUX)]
//! ```
//!
//! Every device is expanded at most once, along the first path that reaches
//! it. Selected sources are walked first, so the devices on the active path
//! are always expanded along it.

use std::collections::HashSet;

use stack_model::{DeviceId, DeviceSnapshot};

use crate::cache::SnapshotView;
use crate::route_table::RouteTable;

/// One source selection on the way to a catalogue entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSelection {
    pub device: DeviceId,
    pub label: String,
}

/// A selectable source of the virtual device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Display name, unique within a catalogue in practice
    pub name: String,
    /// Device offering the source
    pub device: DeviceId,
    /// Label on `device`, `None` for a device that offers no sources
    pub source: Option<String>,
    /// Selections to make, root first, to reach this entry
    pub path: Vec<SourceSelection>,
    /// Every selection on the path is the one currently made
    pub active: bool,
}

/// Flattened view of the selectable sources of a route table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCatalog {
    entries: Vec<SourceEntry>,
}

impl SourceCatalog {
    /// Walk every device reachable from the root
    ///
    /// A label leads into its mapped device when that device has not been
    /// expanded yet and has reported a snapshot; otherwise the label is an
    /// entry of its own. An unavailable device is a single entry named after
    /// the device, whatever sources it last reported.
    pub fn build<V>(table: &RouteTable, snapshots: &V) -> Self
    where
        V: SnapshotView + ?Sized,
    {
        let mut walk = Walk {
            table,
            snapshots,
            expanded: HashSet::new(),
            path: Vec::new(),
            entries: Vec::new(),
        };
        walk.device(table.root(), true);
        Self {
            entries: walk.entries,
        }
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    /// The first active entry
    pub fn active(&self) -> Option<&SourceEntry> {
        self.entries.iter().find(|entry| entry.active)
    }

    pub fn find(&self, name: &str) -> Option<&SourceEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// The first entry offered by a device
    pub fn find_device(&self, device: &DeviceId) -> Option<&SourceEntry> {
        self.entries.iter().find(|entry| &entry.device == device)
    }

    /// Entry names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.name.clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether a snapshot change can alter the catalogue
pub fn affects_catalog(previous: Option<&DeviceSnapshot>, current: &DeviceSnapshot) -> bool {
    match previous {
        None => true,
        Some(previous) => {
            previous.available != current.available
                || previous.selected_source != current.selected_source
                || previous.source_list != current.source_list
                || previous.friendly_name != current.friendly_name
        }
    }
}

struct Walk<'a, V: ?Sized> {
    table: &'a RouteTable,
    snapshots: &'a V,
    expanded: HashSet<&'a DeviceId>,
    path: Vec<SourceSelection>,
    entries: Vec<SourceEntry>,
}

impl<'a, V> Walk<'a, V>
where
    V: SnapshotView + ?Sized,
{
    fn device(&mut self, device: &'a DeviceId, active: bool) {
        let (table, snapshots) = (self.table, self.snapshots);
        let Some(snapshot) = snapshots.snapshot(device) else {
            return;
        };
        self.expanded.insert(device);
        let display = snapshot.display_name(device);

        let mut sources = if snapshot.available {
            snapshot.sources()
        } else {
            Vec::new()
        };
        if sources.is_empty() {
            self.entries.push(SourceEntry {
                name: display.to_string(),
                device: device.clone(),
                source: None,
                path: self.path.clone(),
                active,
            });
            return;
        }

        if let Some(current) = snapshot.selected_source.as_deref() {
            if let Some(index) = sources.iter().position(|label| label == current) {
                let selected = sources.remove(index);
                sources.insert(0, selected);
            }
        }

        for label in sources {
            let selected = active && snapshot.selected_source.as_deref() == Some(label.as_str());
            self.path.push(SourceSelection {
                device: device.clone(),
                label: label.clone(),
            });

            match table.child_for(device, &label) {
                Some(child)
                    if !self.expanded.contains(child) && snapshots.snapshot(child).is_some() =>
                {
                    self.device(child, selected);
                }
                _ => self.entries.push(SourceEntry {
                    name: format!("{}: {}", display, label),
                    device: device.clone(),
                    source: Some(label),
                    path: self.path.clone(),
                    active: selected,
                }),
            }

            self.path.pop();
        }
    }
}
