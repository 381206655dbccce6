use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use somara_domain::entities::{BreathworkClass, PhaseType, SpotifyTrack};
use somara_domain::services::ResizeEdge;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPhaseRequest {
    pub phase_type: PhaseType,
}

/// Drag-and-drop of `active_id` onto `over_id`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPhasesRequest {
    pub active_id: String,
    pub over_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddTrackRequest {
    pub track: SpotifyTrack,
    /// Seconds from the start of the class; defaults to after the last track
    pub start_time: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveTrackRequest {
    /// Where the track was dropped, in seconds
    pub proposed_start: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveTrackResponse {
    pub moved: bool,
    pub class: BreathworkClass,
}

/// Resize by seconds, or by a pixel delta over a timeline of `width_px`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResizeTrackRequest {
    pub edge: ResizeEdge,
    pub delta_seconds: Option<f64>,
    pub delta_px: Option<f64>,
    pub width_px: Option<f64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PlaybackQuery {
    /// Seconds from the start of the class
    pub t: Option<f64>,
}
