//! Capabilities a device advertises

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Set of operations a device supports
///
/// A plain bit set, so platform feature masks can be carried through
/// unchanged.
///
/// # Example
///
/// ```rust
/// use stack_model::FeatureSet;
///
/// let features = FeatureSet::PLAY | FeatureSet::PAUSE;
/// assert!(features.contains(FeatureSet::PLAY));
/// assert!(!features.contains(FeatureSet::VOLUME_SET));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(u32);

impl FeatureSet {
    pub const PAUSE: Self = Self(1);
    pub const SEEK: Self = Self(1 << 1);
    pub const VOLUME_SET: Self = Self(1 << 2);
    pub const VOLUME_MUTE: Self = Self(1 << 3);
    pub const PREVIOUS_TRACK: Self = Self(1 << 4);
    pub const NEXT_TRACK: Self = Self(1 << 5);
    pub const TURN_ON: Self = Self(1 << 7);
    pub const TURN_OFF: Self = Self(1 << 8);
    pub const PLAY_MEDIA: Self = Self(1 << 9);
    pub const VOLUME_STEP: Self = Self(1 << 10);
    pub const SELECT_SOURCE: Self = Self(1 << 11);
    pub const STOP: Self = Self(1 << 12);
    pub const CLEAR_PLAYLIST: Self = Self(1 << 13);
    pub const PLAY: Self = Self(1 << 14);
    pub const SHUFFLE_SET: Self = Self(1 << 15);

    /// Volume features, taken from the device producing sound
    pub const VOLUME: Self =
        Self(Self::VOLUME_SET.0 | Self::VOLUME_MUTE.0 | Self::VOLUME_STEP.0);

    /// Features offered when any device in a stack offers them
    pub const ANY_DEVICE: Self = Self::PLAY_MEDIA;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every feature in `other` is present
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for FeatureSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FeatureSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for FeatureSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for FeatureSet {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureSet({:#x})", self.0)
    }
}
