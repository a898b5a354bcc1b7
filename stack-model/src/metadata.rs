//! Media metadata type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Information about the media a device is currently playing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// Track or programme title
    pub title: Option<String>,
    /// Artist name
    pub artist: Option<String>,
    /// Album name
    pub album_name: Option<String>,
    /// Artwork (entity picture) URL
    pub artwork_url: Option<String>,
    /// Platform content identifier
    pub content_id: Option<String>,
    /// Media duration in seconds
    pub duration_secs: Option<f64>,
    /// Playback position in seconds
    pub position_secs: Option<f64>,
    /// When `position_secs` was last reported
    pub position_updated_at: Option<DateTime<Utc>>,
}

impl MediaMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_artwork_url(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    /// Record a playback position, stamping it with the current time
    pub fn with_position(mut self, position_secs: f64, duration_secs: Option<f64>) -> Self {
        self.position_secs = Some(position_secs);
        self.duration_secs = duration_secs;
        self.position_updated_at = Some(Utc::now());
        self
    }

    /// Drop durations and positions that are not finite numbers
    pub fn finite(mut self) -> Self {
        self.duration_secs = self.duration_secs.filter(|d| d.is_finite());
        self.position_secs = self.position_secs.filter(|p| p.is_finite());
        self
    }

    /// Check if any field is populated
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
