use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::rhythm::BreathingRhythm;
use super::track::{PhaseTrack, SpotifyPlaylist};

/// Kind of a class phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum PhaseType {
    Introduction,
    Grounding,
    Breathing,
    Integration,
    Custom,
}

impl PhaseType {
    /// Name given to a freshly added phase of this type
    pub fn default_name(&self) -> &'static str {
        match self {
            PhaseType::Introduction => "Introduction",
            PhaseType::Grounding => "Grounding",
            PhaseType::Breathing => "Breathing",
            PhaseType::Integration => "Integration",
            PhaseType::Custom => "Custom",
        }
    }

    /// Introduction and integration open and close every class
    pub fn is_fixed(&self) -> bool {
        matches!(self, PhaseType::Introduction | PhaseType::Integration)
    }
}

/// A named, timed segment of a class. `duration` is in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BreathworkPhase {
    pub id: String,
    #[serde(rename = "type")]
    pub phase_type: PhaseType,
    pub name: String,
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breathing_rhythm: Option<BreathingRhythm>,
    /// Breath hold at the end of the phase, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breath_hold_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_instructions: Option<String>,
    /// Tracks stored per phase by older documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<PhaseTrack>>,
}

impl BreathworkPhase {
    pub fn seconds(&self) -> f64 {
        f64::from(self.duration) * 60.0
    }
}

/// A complete class document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BreathworkClass {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sum of phase durations, in minutes
    #[serde(default)]
    pub total_duration: u32,
    #[serde(default)]
    pub phases: Vec<BreathworkPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_playlist: Option<SpotifyPlaylist>,
    /// Tracks placed on the class timeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<PhaseTrack>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub created_at: i64,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub updated_at: i64,
}

impl BreathworkClass {
    /// Empty class with no phases
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            theme: None,
            description: None,
            total_duration: 0,
            phases: Vec::new(),
            spotify_playlist: None,
            tracks: None,
            is_online: None,
            location: None,
            time: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Length of the timeline in seconds
    pub fn timeline_seconds(&self) -> f64 {
        f64::from(self.total_duration) * 60.0
    }

    pub fn phase(&self, id: &str) -> Option<&BreathworkPhase> {
        self.phases.iter().find(|p| p.id == id)
    }

    /// Timeline tracks, empty when none have been placed
    pub fn timeline_tracks(&self) -> &[PhaseTrack] {
        self.tracks.as_deref().unwrap_or(&[])
    }

    pub fn title(&self) -> &str {
        self.theme.as_deref().unwrap_or("Untitled Class")
    }
}

/// Header fields of a new class
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    #[validate(length(max = 200, message = "Theme must be at most 200 characters"))]
    pub theme: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    pub is_online: Option<bool>,
    pub location: Option<String>,
    pub time: Option<String>,
}

/// Partial update of a class header. Absent fields are left untouched,
/// explicit `null` clears optional ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassRequest {
    #[serde(default, deserialize_with = "present")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<String>))]
    pub theme: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<String>))]
    pub description: Option<Option<String>>,
    pub is_online: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<String>))]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<String>))]
    pub time: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<SpotifyPlaylist>))]
    pub spotify_playlist: Option<Option<SpotifyPlaylist>>,
}

/// Fields of a phase that can be edited
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PhaseChanges {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 240, message = "Duration must be between 1 and 240 minutes"))]
    pub duration: Option<u32>,
    pub breathing_rhythm: Option<BreathingRhythm>,
    pub breath_hold_duration: Option<u32>,
    pub custom_type_name: Option<String>,
    pub grounding_instructions: Option<String>,
}

/// Distinguishes a field sent as `null` from a missing one
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
