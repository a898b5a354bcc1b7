//! Chain resolution from the root to the active leaf
//!
//! Starting at the root, follow each hub's currently selected source to the
//! device mapped to it. The walk stops at the first device that is not a hub,
//! whose source cannot be determined, whose source leads nowhere, or whose
//! source leads back into the chain.
//!
//! ```text
//! TV ──"HDMI 2"──▶ Stereo ──"PVR"──▶ Bedroom        chain = [TV, Stereo, Bedroom]
//!  ▲                  │
//!  └──────"AUX"───────┘                              chain = [TV, Stereo] (cycle)
//! ```

use std::collections::HashSet;

use stack_model::DeviceId;

use crate::cache::SnapshotView;
use crate::route_table::RouteTable;

/// Why resolution stopped at the leaf
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The leaf is not a hub
    NotAHub,
    /// The leaf is a hub but is unavailable or has never reported
    HubUnavailable,
    /// The leaf is a hub that reports no selected source
    SourceUnknown,
    /// The selected source has no mapped device (e.g. a physical input)
    NoMapping { label: String },
    /// The selected source leads to a device already in the chain
    Cycle { revisited: DeviceId },
    /// The hard depth bound was reached
    DepthLimit,
}

/// Ordered devices from the root to the resolved leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    devices: Vec<DeviceId>,
    termination: Termination,
}

impl Chain {
    /// The root device
    pub fn root(&self) -> &DeviceId {
        &self.devices[0]
    }

    /// The resolved leaf: target for playback commands
    pub fn leaf(&self) -> &DeviceId {
        // Chains always contain at least the root
        &self.devices[self.devices.len() - 1]
    }

    pub fn devices(&self) -> &[DeviceId] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Never true: chains hold at least the root
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn contains(&self, device: &DeviceId) -> bool {
        self.devices.contains(device)
    }

    pub fn termination(&self) -> &Termination {
        &self.termination
    }

    pub fn is_cyclic(&self) -> bool {
        matches!(self.termination, Termination::Cycle { .. })
    }
}

/// Resolve the current chain
///
/// Pure function of the route table and the snapshots: no I/O, no hidden
/// state. Terminates after at most `hub_count` forward steps, so the chain
/// holds at most `hub_count + 1` devices. Devices without a snapshot are
/// treated as unavailable.
pub fn resolve<V>(table: &RouteTable, snapshots: &V) -> Chain
where
    V: SnapshotView + ?Sized,
{
    let max_steps = table.hub_count();
    let mut devices = vec![table.root().clone()];
    let mut visited: HashSet<&DeviceId> = HashSet::from([table.root()]);
    let mut current = table.root();

    let termination = loop {
        if !table.is_hub(current) {
            break Termination::NotAHub;
        }
        // Second guard, independent of `visited`
        if devices.len() > max_steps {
            break Termination::DepthLimit;
        }

        let Some(snapshot) = snapshots.snapshot(current).filter(|s| s.available) else {
            break Termination::HubUnavailable;
        };
        let Some(label) = snapshot.selected_source.as_deref() else {
            break Termination::SourceUnknown;
        };
        let Some(child) = table.child_for(current, label) else {
            break Termination::NoMapping {
                label: label.to_string(),
            };
        };
        if !visited.insert(child) {
            break Termination::Cycle {
                revisited: child.clone(),
            };
        }

        devices.push(child.clone());
        current = child;
    };

    Chain {
        devices,
        termination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StackConfig;
    use rstest::rstest;
    use stack_model::DeviceSnapshot;
    use std::collections::HashMap;

    fn table(config: StackConfig) -> RouteTable {
        RouteTable::from_config_with(&config, |_| true).unwrap()
    }

    fn lounge() -> RouteTable {
        table(
            StackConfig::builder("Lounge")
                .hub("TV", [("HDMI 1", "LoungeRoom"), ("HDMI 2", "Stereo")])
                .hub("Stereo", [("PVR", "Bedroom"), ("AUX", "TV")])
                .build(),
        )
    }

    fn snapshots(entries: &[(&str, Option<&str>)]) -> HashMap<DeviceId, DeviceSnapshot> {
        entries
            .iter()
            .map(|(id, source)| {
                let mut snapshot = DeviceSnapshot::available();
                snapshot.selected_source = source.map(str::to_string);
                (DeviceId::new(*id), snapshot)
            })
            .collect()
    }

    fn ids(chain: &Chain) -> Vec<&str> {
        chain.devices().iter().map(|d| d.as_str()).collect()
    }

    #[rstest]
    #[case::full_chain(
        &[("TV", Some("HDMI 2")), ("Stereo", Some("PVR")), ("Bedroom", None)],
        vec!["TV", "Stereo", "Bedroom"]
    )]
    #[case::non_hub_child(
        &[("TV", Some("HDMI 1")), ("Stereo", Some("PVR"))],
        vec!["TV", "LoungeRoom"]
    )]
    #[case::physical_input(
        &[("TV", Some("Channels"))],
        vec!["TV"]
    )]
    #[case::root_source_unknown(
        &[("TV", None)],
        vec!["TV"]
    )]
    #[case::hub_source_unknown(
        &[("TV", Some("HDMI 2")), ("Stereo", None)],
        vec!["TV", "Stereo"]
    )]
    #[case::label_case_mismatch(
        &[("TV", Some("hdmi 2")), ("Stereo", Some("PVR"))],
        vec!["TV"]
    )]
    fn test_resolve(#[case] reported: &[(&str, Option<&str>)], #[case] expected: Vec<&str>) {
        let chain = resolve(&lounge(), &snapshots(reported));
        assert_eq!(ids(&chain), expected);
        assert_eq!(chain.root().as_str(), "TV");
        assert_eq!(chain.leaf().as_str(), *expected.last().unwrap());
    }

    #[test]
    fn test_termination_reasons() {
        let table = lounge();

        let chain = resolve(&table, &snapshots(&[("TV", Some("HDMI 1"))]));
        assert_eq!(chain.termination(), &Termination::NotAHub);

        let chain = resolve(&table, &snapshots(&[("TV", Some("Channels"))]));
        assert_eq!(
            chain.termination(),
            &Termination::NoMapping {
                label: "Channels".to_string()
            }
        );

        let chain = resolve(&table, &snapshots(&[("TV", None)]));
        assert_eq!(chain.termination(), &Termination::SourceUnknown);
    }

    #[test]
    fn test_unavailable_hub_stops_resolution() {
        let mut reported = snapshots(&[("TV", Some("HDMI 2")), ("Bedroom", None)]);
        reported.insert(
            DeviceId::new("Stereo"),
            DeviceSnapshot::unavailable().with_source("PVR"),
        );

        let chain = resolve(&lounge(), &reported);
        assert_eq!(ids(&chain), vec!["TV", "Stereo"]);
        assert_eq!(chain.termination(), &Termination::HubUnavailable);
    }

    #[test]
    fn test_missing_root_snapshot() {
        let chain = resolve(&lounge(), &HashMap::new());
        assert_eq!(ids(&chain), vec!["TV"]);
        assert_eq!(chain.termination(), &Termination::HubUnavailable);
    }

    #[test]
    fn test_cycle_stops_at_revisit() {
        let reported = snapshots(&[("TV", Some("HDMI 2")), ("Stereo", Some("AUX"))]);

        let chain = resolve(&lounge(), &reported);
        assert_eq!(ids(&chain), vec!["TV", "Stereo"]);
        assert!(chain.is_cyclic());
        assert_eq!(
            chain.termination(),
            &Termination::Cycle {
                revisited: DeviceId::new("TV")
            }
        );
    }

    #[test]
    fn test_self_loop() {
        let table = table(
            StackConfig::builder("Loop")
                .hub("amp", [("LOOP", "amp"), ("CD", "cd")])
                .build(),
        );
        let chain = resolve(&table, &snapshots(&[("amp", Some("LOOP"))]));
        assert_eq!(ids(&chain), vec!["amp"]);
        assert!(chain.is_cyclic());
    }

    #[test]
    fn test_long_cycle_not_through_root() {
        let table = table(
            StackConfig::builder("Ring")
                .hub("a", [("next", "b")])
                .hub("b", [("next", "c")])
                .hub("c", [("next", "d")])
                .hub("d", [("next", "b")])
                .build(),
        );
        let reported = snapshots(&[
            ("a", Some("next")),
            ("b", Some("next")),
            ("c", Some("next")),
            ("d", Some("next")),
        ]);

        let chain = resolve(&table, &reported);
        assert_eq!(ids(&chain), vec!["a", "b", "c", "d"]);
        assert_eq!(
            chain.termination(),
            &Termination::Cycle {
                revisited: DeviceId::new("b")
            }
        );
        assert!(chain.len() <= table.hub_count() + 1);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let table = lounge();
        let reported = snapshots(&[("TV", Some("HDMI 2")), ("Stereo", Some("PVR"))]);
        assert_eq!(resolve(&table, &reported), resolve(&table, &reported));
    }
}
