//! Composite state of a virtual device

use serde::Serialize;
use stack_model::{DeviceId, DeviceSnapshot, FeatureSet, MediaMetadata, PlaybackState};

use crate::cache::SnapshotView;
use crate::catalog::SourceCatalog;
use crate::resolver::Chain;
use crate::route_table::RouteTable;

/// State the virtual device presents to the outside world
///
/// Derived from the chain and the snapshots of its root and leaf; never
/// mutated directly. Volume and mute belong to the root, playback and media
/// to the leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualDeviceState {
    pub name: String,
    /// Whether the root is reachable
    pub available: bool,
    pub playback_state: PlaybackState,
    pub media_metadata: Option<MediaMetadata>,
    pub volume_level: Option<f32>,
    pub is_muted: Option<bool>,
    pub root_device: DeviceId,
    /// Leaf of the current chain
    pub active_source_device: DeviceId,
    /// Name of the active catalogue entry
    pub source: Option<String>,
    /// All catalogue entry names, sorted
    pub source_list: Vec<String>,
    pub shuffle: Option<bool>,
    /// Leaf features, with volume features from the root and media features
    /// from any device in the table
    pub supported_features: FeatureSet,
}

impl VirtualDeviceState {
    /// Derive the composite from the current inputs
    ///
    /// Nothing is carried over from an earlier leaf: a leaf that is
    /// unreachable or reports an unknown state shows `Unknown` with no media.
    /// Levels and positions that are not finite are reported as absent.
    pub fn derive<V>(
        name: &str,
        table: &RouteTable,
        chain: &Chain,
        snapshots: &V,
        catalog: &SourceCatalog,
    ) -> Self
    where
        V: SnapshotView + ?Sized,
    {
        let unavailable = DeviceSnapshot::unavailable();
        let root = snapshots.snapshot(chain.root()).unwrap_or(&unavailable);
        let leaf = snapshots.snapshot(chain.leaf()).unwrap_or(&unavailable);

        let (playback_state, media_metadata, shuffle) =
            if !leaf.available || leaf.playback_state == PlaybackState::Unknown {
                (PlaybackState::Unknown, None, None)
            } else {
                (
                    leaf.playback_state,
                    leaf.media_metadata.clone().map(MediaMetadata::finite),
                    leaf.shuffle,
                )
            };

        Self {
            name: name.to_string(),
            available: root.available,
            playback_state,
            media_metadata,
            volume_level: root.volume_level.filter(|level| level.is_finite()),
            is_muted: root.is_muted,
            root_device: chain.root().clone(),
            active_source_device: chain.leaf().clone(),
            source: catalog.active().map(|entry| entry.name.clone()),
            source_list: catalog.names(),
            shuffle,
            supported_features: supported_features(table, root, leaf, snapshots),
        }
    }

    /// Whether the virtual device should be presented as off
    pub fn is_off(&self) -> bool {
        !self.available || self.playback_state.is_off()
    }
}

fn supported_features<V>(
    table: &RouteTable,
    root: &DeviceSnapshot,
    leaf: &DeviceSnapshot,
    snapshots: &V,
) -> FeatureSet
where
    V: SnapshotView + ?Sized,
{
    let reported = |snapshot: &DeviceSnapshot| {
        if snapshot.available {
            snapshot.supported_features
        } else {
            FeatureSet::empty()
        }
    };

    let any_device = table
        .devices()
        .iter()
        .filter_map(|device| snapshots.snapshot(device))
        .fold(FeatureSet::empty(), |acc, snapshot| acc | reported(snapshot));

    let mut features = reported(leaf) & !FeatureSet::VOLUME & !FeatureSet::ANY_DEVICE;
    features |= FeatureSet::SELECT_SOURCE;
    features |= reported(root) & FeatureSet::VOLUME;
    features |= any_device & FeatureSet::ANY_DEVICE;
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StackConfig;
    use crate::resolver::resolve;
    use crate::route_table::RouteTable;
    use std::collections::HashMap;

    fn lounge() -> RouteTable {
        let config = StackConfig::builder("Lounge")
            .hub("tv", [("HDMI 1", "lounge_room"), ("HDMI 2", "stereo")])
            .hub("stereo", [("PVR", "bedroom"), ("AUX", "tv")])
            .build();
        RouteTable::from_config_with(&config, |_| true).unwrap()
    }

    fn derive(snapshots: &HashMap<DeviceId, DeviceSnapshot>) -> VirtualDeviceState {
        let table = lounge();
        let chain = resolve(&table, snapshots);
        let catalog = SourceCatalog::build(&table, snapshots);
        VirtualDeviceState::derive("Lounge", &table, &chain, snapshots, &catalog)
    }

    fn base() -> HashMap<DeviceId, DeviceSnapshot> {
        HashMap::from([
            (
                DeviceId::new("tv"),
                DeviceSnapshot::available()
                    .with_name("TV")
                    .with_source_list(["HDMI 1", "HDMI 2"])
                    .with_source("HDMI 2")
                    .with_volume(0.3)
                    .with_muted(false),
            ),
            (
                DeviceId::new("stereo"),
                DeviceSnapshot::available()
                    .with_name("Stereo")
                    .with_source_list(["PVR", "AUX"])
                    .with_source("PVR")
                    .with_volume(0.9),
            ),
            (
                DeviceId::new("bedroom"),
                DeviceSnapshot::available()
                    .with_name("Bedroom")
                    .with_playback_state(PlaybackState::Playing)
                    .with_metadata(MediaMetadata::new().with_title("News")),
            ),
        ])
    }

    #[test]
    fn test_volume_from_root_playback_from_leaf() {
        let state = derive(&base());

        assert!(state.available);
        assert_eq!(state.root_device.as_str(), "tv");
        assert_eq!(state.active_source_device.as_str(), "bedroom");
        assert_eq!(state.volume_level, Some(0.3));
        assert_eq!(state.is_muted, Some(false));
        assert_eq!(state.playback_state, PlaybackState::Playing);
        assert_eq!(
            state.media_metadata.and_then(|m| m.title).as_deref(),
            Some("News")
        );
        assert_eq!(state.source.as_deref(), Some("Bedroom"));
    }

    #[test]
    fn test_unavailable_hub_degrades_to_unknown() {
        let mut snapshots = base();
        snapshots.insert(
            DeviceId::new("stereo"),
            DeviceSnapshot::unavailable().with_source("PVR"),
        );

        let state = derive(&snapshots);
        assert_eq!(state.active_source_device.as_str(), "stereo");
        assert_eq!(state.playback_state, PlaybackState::Unknown);
        assert!(state.media_metadata.is_none());
        assert!(state.available);
    }

    #[test]
    fn test_unknown_leaf_state_drops_metadata() {
        let mut snapshots = base();
        snapshots.insert(
            DeviceId::new("bedroom"),
            DeviceSnapshot::available()
                .with_playback_state(PlaybackState::Unknown)
                .with_metadata(MediaMetadata::new().with_title("Stale")),
        );

        let state = derive(&snapshots);
        assert_eq!(state.playback_state, PlaybackState::Unknown);
        assert!(state.media_metadata.is_none());
    }

    #[test]
    fn test_unreachable_root() {
        let mut snapshots = base();
        snapshots.insert(DeviceId::new("tv"), DeviceSnapshot::unavailable());

        let state = derive(&snapshots);
        assert!(!state.available);
        assert!(state.is_off());
        assert_eq!(state.active_source_device.as_str(), "tv");
        assert_eq!(state.volume_level, None);
    }

    #[test]
    fn test_equal_inputs_equal_state() {
        assert_eq!(derive(&base()), derive(&base()));
    }

    #[test]
    fn test_non_finite_levels_are_absent() {
        let mut snapshots = base();
        snapshots.insert(
            DeviceId::new("tv"),
            DeviceSnapshot::available()
                .with_source_list(["HDMI 1", "HDMI 2"])
                .with_source("HDMI 2")
                .with_volume(f32::NAN),
        );
        snapshots.insert(
            DeviceId::new("bedroom"),
            DeviceSnapshot::available()
                .with_playback_state(PlaybackState::Playing)
                .with_metadata(MediaMetadata::new().with_position(f64::NAN, None)),
        );

        let state = derive(&snapshots);
        assert_eq!(state.volume_level, None);
        assert_eq!(state.media_metadata.as_ref().and_then(|m| m.position_secs), None);
        assert_eq!(state, derive(&snapshots));
    }

    #[test]
    fn test_features_combine_leaf_root_and_any_device() {
        let mut snapshots = base();
        snapshots.insert(
            DeviceId::new("tv"),
            DeviceSnapshot::available()
                .with_source_list(["HDMI 1", "HDMI 2"])
                .with_source("HDMI 2")
                .with_features(FeatureSet::VOLUME_SET | FeatureSet::VOLUME_MUTE | FeatureSet::PLAY),
        );
        snapshots.insert(
            DeviceId::new("stereo"),
            DeviceSnapshot::available()
                .with_source_list(["PVR", "AUX"])
                .with_source("PVR")
                .with_features(FeatureSet::VOLUME_STEP | FeatureSet::PLAY_MEDIA),
        );
        snapshots.insert(
            DeviceId::new("bedroom"),
            DeviceSnapshot::available()
                .with_shuffle(true)
                .with_features(FeatureSet::PAUSE | FeatureSet::SHUFFLE_SET | FeatureSet::VOLUME_STEP),
        );

        let state = derive(&snapshots);
        assert_eq!(
            state.supported_features,
            FeatureSet::PAUSE
                | FeatureSet::SHUFFLE_SET
                | FeatureSet::SELECT_SOURCE
                | FeatureSet::VOLUME_SET
                | FeatureSet::VOLUME_MUTE
                | FeatureSet::PLAY_MEDIA
        );
        assert_eq!(state.shuffle, Some(true));
    }

    #[test]
    fn test_unavailable_leaf_reports_no_features() {
        let mut snapshots = base();
        snapshots.insert(
            DeviceId::new("bedroom"),
            DeviceSnapshot::unavailable().with_features(FeatureSet::PAUSE | FeatureSet::PLAY),
        );

        let state = derive(&snapshots);
        assert_eq!(state.supported_features, FeatureSet::SELECT_SOURCE);
    }
}
