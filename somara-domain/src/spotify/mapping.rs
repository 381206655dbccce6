//! Web API payloads and their conversion into Somara's track types.
//!
//! The raw structs only name the fields we read; Spotify sends many more.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::track::{SpotifyPlaylist, SpotifyTrack, TrackFeatures};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: u64,
}

/// `GET /v1/me`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub followers: Option<Followers>,
    pub country: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TracksRef {
    #[serde(default)]
    pub total: u64,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPlaylist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub external_urls: Option<ExternalUrls>,
    pub owner: Option<Owner>,
    pub tracks: Option<TracksRef>,
    pub public: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrack {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub duration_ms: u64,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub is_local: bool,
    pub album: Option<Album>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPlaylistItem {
    pub track: Option<RawTrack>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAudioFeatures {
    pub id: String,
    pub tempo: Option<f64>,
    pub energy: Option<f64>,
    pub danceability: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub valence: Option<f64>,
    pub speechiness: Option<f64>,
}

/// `GET /v1/audio-features?ids=`; unknown ids come back as `null`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioFeaturesPage {
    #[serde(default)]
    pub audio_features: Vec<Option<RawAudioFeatures>>,
}

/// One page of a paginated Web API listing
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next: Option<String>,
}

/// oEmbed answer for a public link
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OEmbed {
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Spotify account of the signed-in listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SpotifyUser {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub followers: u64,
    pub country: Option<String>,
    /// `premium` or `free`
    pub product: Option<String>,
}

impl From<RawUser> for SpotifyUser {
    fn from(raw: RawUser) -> Self {
        Self {
            image_url: raw.images.into_iter().next().map(|i| i.url),
            followers: raw.followers.map(|f| f.total).unwrap_or(0),
            id: raw.id,
            display_name: raw.display_name,
            email: raw.email,
            country: raw.country,
            product: raw.product,
        }
    }
}

/// Entry of the listener's playlist library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub url: String,
    pub owner: Option<String>,
    pub track_count: u64,
    pub public: Option<bool>,
}

impl From<RawPlaylist> for PlaylistSummary {
    fn from(raw: RawPlaylist) -> Self {
        let url = playlist_url(&raw);
        Self {
            image_url: raw.images.into_iter().next().map(|i| i.url),
            owner: raw.owner.map(|o| o.display_name.unwrap_or(o.id)),
            track_count: raw.tracks.map(|t| t.total).unwrap_or(0),
            url,
            id: raw.id,
            name: raw.name,
            description: raw.description,
            public: raw.public,
        }
    }
}

fn playlist_url(raw: &RawPlaylist) -> String {
    raw.external_urls
        .as_ref()
        .and_then(|u| u.spotify.clone())
        .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", raw.id))
}

/// A playlist with all its items and whatever audio features Spotify gave us
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistTracks {
    pub playlist: RawPlaylist,
    pub tracks: Vec<RawPlaylistItem>,
    pub audio_features: HashMap<String, RawAudioFeatures>,
    /// Set when the access token had to be refreshed along the way
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_access_token: Option<String>,
}

impl PlaylistTracks {
    /// Spotify IDs of the playable tracks, in playlist order
    pub fn track_ids(items: &[RawPlaylistItem]) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| item.track.as_ref())
            .filter(|track| !track.is_local)
            .filter_map(|track| track.id.clone())
            .collect()
    }

    /// Playable tracks with their features attached
    pub fn spotify_tracks(&self) -> Vec<SpotifyTrack> {
        self.tracks
            .iter()
            .filter_map(|item| item.track.as_ref())
            .filter(|track| !track.is_local)
            .filter_map(|track| {
                let id = track.id.as_ref()?;
                Some(map_track(track, id, self.audio_features.get(id)))
            })
            .collect()
    }

    /// Playlist as attached to a class, linked by `url`
    pub fn to_spotify_playlist(&self, id: &str, url: &str) -> SpotifyPlaylist {
        let tracks = self.spotify_tracks();
        let total_duration = tracks.iter().map(|t| t.duration).sum();
        SpotifyPlaylist {
            id: id.to_string(),
            name: self.playlist.name.clone(),
            image_url: self.playlist.images.first().map(|i| i.url.clone()),
            url: url.to_string(),
            tracks: Some(tracks),
            total_duration: Some(total_duration),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert a Web API track; durations are floored to whole seconds
pub fn map_track(track: &RawTrack, id: &str, features: Option<&RawAudioFeatures>) -> SpotifyTrack {
    let features = features
        .map(|f| TrackFeatures {
            bpm: f.tempo.map(|t| t.round().max(0.0) as u32),
            energy: f.energy.map(round2),
            danceability: f.danceability.map(round2),
            acousticness: f.acousticness.map(round2),
            instrumentalness: f.instrumentalness.map(round2),
            valence: f.valence.map(round2),
            speechiness: f.speechiness.map(round2),
        })
        .unwrap_or_default();

    SpotifyTrack {
        id: id.to_string(),
        name: track.name.clone(),
        artist: track.artists.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", "),
        duration: (track.duration_ms / 1000) as u32,
        preview_url: track.preview_url.clone(),
        image_url: track
            .album
            .as_ref()
            .and_then(|album| album.images.first())
            .map(|i| i.url.clone()),
        features,
    }
}
