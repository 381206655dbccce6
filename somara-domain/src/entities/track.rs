use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Audio analysis attached to a track, when Spotify provides it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TrackFeatures {
    /// Tempo rounded to whole beats per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danceability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acousticness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrumentalness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speechiness: Option<f64>,
}

/// A track as it comes out of a Spotify playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SpotifyTrack {
    /// Spotify track ID
    pub id: String,
    pub name: String,
    /// Artist names joined with ", "
    pub artist: String,
    /// Length in whole seconds
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub features: TrackFeatures,
}

/// A Spotify playlist attached to a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<SpotifyTrack>>,
    /// Sum of track durations in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u32>,
}

/// A track placed on a class timeline.
///
/// `absolute_start_time` and `duration` are seconds from the start of the
/// class. `start_time` is the legacy offset inside a phase and is only read
/// when migrating old documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PhaseTrack {
    pub id: String,
    /// Spotify track ID
    pub track_id: String,
    pub track_name: String,
    pub artist: String,
    pub duration: f64,
    /// Full length of the Spotify track; older documents may lack it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_duration: Option<f64>,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub absolute_start_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(flatten)]
    pub features: TrackFeatures,
}

impl PhaseTrack {
    /// Timeline position where the track stops playing
    pub fn end_time(&self) -> f64 {
        self.absolute_start_time + self.duration
    }

    /// Longest the track can be stretched to
    pub fn max_duration(&self) -> f64 {
        self.original_duration.unwrap_or(self.duration)
    }

    /// Whether the track is playing at `seconds`
    pub fn contains(&self, seconds: f64) -> bool {
        seconds >= self.absolute_start_time && seconds < self.end_time()
    }

    /// Whether the track shares any time with `[start, start + duration)`
    pub fn overlaps(&self, start: f64, duration: f64) -> bool {
        start < self.end_time() && start + duration > self.absolute_start_time
    }
}
