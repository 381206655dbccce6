//! Placement of tracks on the class timeline.
//!
//! All positions are seconds from the start of the class. The timeline is
//! `total_duration * 60` seconds long and tracks never leave it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::class::BreathworkClass;
use crate::entities::track::{PhaseTrack, SpotifyTrack};

/// Shortest a track can be trimmed to
pub const MIN_TRACK_SECONDS: f64 = 30.0;
/// Distance under which a dropped track snaps to the end of its neighbour
pub const SNAP_THRESHOLD_SECONDS: f64 = 2.0;
/// Drops closer than this to the current position leave the track in place
pub const MOVE_EPSILON_SECONDS: f64 = 0.1;

/// Errors raised while editing phases or tracks
#[derive(Debug, Error, PartialEq)]
pub enum TimelineError {
    #[error("Phase not found: {0}")]
    PhaseNotFound(String),

    #[error("Track not found: {0}")]
    TrackNotFound(String),

    #[error("Introduction and integration phases cannot be {0}")]
    FixedPhase(&'static str),

    #[error("Invalid timeline input: {0}")]
    InvalidInput(String),
}

/// Edge of a track grabbed for resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ResizeEdge {
    Left,
    Right,
}

/// Raw edits to a placed track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TrackChanges {
    pub absolute_start_time: Option<f64>,
    pub duration: Option<f64>,
}

/// Start and end of a phase on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PhaseSpan {
    pub phase_id: String,
    pub start: f64,
    pub end: f64,
}

fn clamp(value: f64, max: f64) -> f64 {
    value.min(max).max(0.0)
}

/// Convert a horizontal drag distance to seconds for a timeline drawn
/// `width_px` wide
pub fn pixels_to_seconds(delta_px: f64, width_px: f64, timeline_seconds: f64) -> Result<f64, TimelineError> {
    if !(width_px > 0.0) {
        return Err(TimelineError::InvalidInput(format!(
            "timeline width must be positive, got {}",
            width_px
        )));
    }
    Ok(delta_px / width_px * timeline_seconds)
}

/// Tracks ordered by start time
pub fn sorted_tracks(class: &BreathworkClass) -> Vec<PhaseTrack> {
    let mut tracks = class.timeline_tracks().to_vec();
    sort_by_start(&mut tracks);
    tracks
}

fn sort_by_start(tracks: &mut [PhaseTrack]) {
    tracks.sort_by(|a, b| a.absolute_start_time.total_cmp(&b.absolute_start_time));
}

fn track_mut<'a>(class: &'a mut BreathworkClass, id: &str) -> Result<&'a mut PhaseTrack, TimelineError> {
    class
        .tracks
        .as_mut()
        .and_then(|tracks| tracks.iter_mut().find(|t| t.id == id))
        .ok_or_else(|| TimelineError::TrackNotFound(id.to_string()))
}

fn track<'a>(class: &'a BreathworkClass, id: &str) -> Result<&'a PhaseTrack, TimelineError> {
    class
        .timeline_tracks()
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| TimelineError::TrackNotFound(id.to_string()))
}

/// Place a Spotify track on the timeline.
///
/// Without an explicit start the track goes right after the last one.
pub fn add_track(class: &mut BreathworkClass, spotify: &SpotifyTrack, start: Option<f64>) -> PhaseTrack {
    let absolute_start_time = match start {
        Some(start) => start,
        None => sorted_tracks(class).last().map(PhaseTrack::end_time).unwrap_or(0.0),
    };
    let duration = f64::from(spotify.duration);

    let placed = PhaseTrack {
        id: Uuid::new_v4().to_string(),
        track_id: spotify.id.clone(),
        track_name: spotify.name.clone(),
        artist: spotify.artist.clone(),
        duration,
        original_duration: Some(duration),
        start_time: 0.0,
        absolute_start_time,
        image_url: spotify.image_url.clone(),
        preview_url: spotify.preview_url.clone(),
        features: spotify.features.clone(),
    };

    let tracks = class.tracks.get_or_insert_with(Vec::new);
    tracks.push(placed.clone());
    sort_by_start(tracks);
    placed
}

/// Merge edits into a track without clamping.
///
/// A missing `original_duration` is filled with the longer of the old and
/// new durations so the track can be stretched back later.
pub fn update_track(class: &mut BreathworkClass, id: &str, changes: &TrackChanges) -> Result<PhaseTrack, TimelineError> {
    let track = track_mut(class, id)?;
    if track.original_duration.is_none() {
        let new_duration = changes.duration.unwrap_or(track.duration);
        track.original_duration = Some(track.duration.max(new_duration));
    }
    if let Some(start) = changes.absolute_start_time {
        track.absolute_start_time = start;
    }
    if let Some(duration) = changes.duration {
        track.duration = duration;
    }
    Ok(track.clone())
}

pub fn remove_track(class: &mut BreathworkClass, id: &str) -> Result<(), TimelineError> {
    let tracks = class
        .tracks
        .as_mut()
        .ok_or_else(|| TimelineError::TrackNotFound(id.to_string()))?;
    let before = tracks.len();
    tracks.retain(|t| t.id != id);
    if tracks.len() == before {
        return Err(TimelineError::TrackNotFound(id.to_string()));
    }
    Ok(())
}

/// Move a track, keeping it fully inside the timeline
pub fn set_start_time(class: &mut BreathworkClass, id: &str, seconds: f64) -> Result<PhaseTrack, TimelineError> {
    let total = class.timeline_seconds();
    let track = track_mut(class, id)?;
    track.absolute_start_time = clamp(seconds, total - track.duration);
    Ok(track.clone())
}

/// Trim or stretch a track from its right edge
pub fn set_duration(class: &mut BreathworkClass, id: &str, seconds: f64) -> Result<PhaseTrack, TimelineError> {
    let total = class.timeline_seconds();
    let track = track_mut(class, id)?;
    let wanted = seconds.max(MIN_TRACK_SECONDS);
    track.duration = wanted
        .min(total - track.absolute_start_time)
        .min(track.max_duration());
    Ok(track.clone())
}

/// State of a track when a resize drag began. Every drag update is applied
/// against this snapshot, not against the previous update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeGesture {
    pub edge: ResizeEdge,
    pub start_time: f64,
    pub duration: f64,
}

impl ResizeGesture {
    pub fn begin(track: &PhaseTrack, edge: ResizeEdge) -> Self {
        Self {
            edge,
            start_time: track.absolute_start_time,
            duration: track.duration,
        }
    }

    /// Start and duration after dragging the edge by `delta` seconds
    pub fn apply(&self, delta: f64, timeline_seconds: f64, max_duration: f64) -> (f64, f64) {
        match self.edge {
            ResizeEdge::Left => {
                // The right edge stays where the drag began
                let end = self.start_time + self.duration;
                let start = (self.start_time + delta).max(0.0);
                let duration = (self.duration - delta).min(end - start).max(MIN_TRACK_SECONDS);
                let start = start.min(timeline_seconds - duration).max(0.0);
                let duration = duration
                    .min(timeline_seconds - start)
                    .min(max_duration)
                    .max(MIN_TRACK_SECONDS);
                (start, duration)
            }
            ResizeEdge::Right => {
                let duration = (self.duration + delta)
                    .max(MIN_TRACK_SECONDS)
                    .min(timeline_seconds - self.start_time)
                    .min(max_duration);
                (self.start_time, duration)
            }
        }
    }
}

/// Resize a track by dragging one of its edges `delta` seconds
pub fn resize_track(class: &mut BreathworkClass, id: &str, edge: ResizeEdge, delta: f64) -> Result<PhaseTrack, TimelineError> {
    let total = class.timeline_seconds();
    let track = track_mut(class, id)?;
    let gesture = ResizeGesture::begin(track, edge);
    let (start, duration) = gesture.apply(delta, total, track.max_duration());
    track.absolute_start_time = start;
    track.duration = duration;
    Ok(track.clone())
}

/// Where a track dropped at `proposed` should land.
///
/// The track snaps to the end of the closest earlier track when within
/// [`SNAP_THRESHOLD_SECONDS`], and is pushed in front of a track it would
/// overlap.
pub fn find_snap_position(class: &BreathworkClass, id: &str, proposed: f64) -> Result<f64, TimelineError> {
    let moving = track(class, id)?;
    let max_start = class.timeline_seconds() - moving.duration;
    let clamped = clamp(proposed, max_start);

    let others: Vec<PhaseTrack> = sorted_tracks(class).into_iter().filter(|t| t.id != id).collect();

    let previous = others
        .iter()
        .filter(|t| t.end_time() <= clamped)
        .max_by(|a, b| a.end_time().total_cmp(&b.end_time()));
    if let Some(previous) = previous {
        let snap = previous.end_time();
        if (clamped - snap).abs() < SNAP_THRESHOLD_SECONDS {
            return Ok(clamp(snap, max_start));
        }
    }

    if let Some(collider) = others.iter().find(|t| t.overlaps(clamped, moving.duration)) {
        let collider_end = collider.end_time();
        if (clamped - collider_end).abs() < SNAP_THRESHOLD_SECONDS {
            return Ok(clamp(collider_end, max_start));
        }
        let before = (collider.absolute_start_time - moving.duration).max(0.0);
        return Ok(clamp(before, max_start));
    }

    Ok(clamped)
}

/// Finish a drag. Returns whether the track moved.
pub fn drop_track(class: &mut BreathworkClass, id: &str, proposed: f64) -> Result<bool, TimelineError> {
    let target = find_snap_position(class, id, proposed)?;
    let track = track_mut(class, id)?;
    if (target - track.absolute_start_time).abs() <= MOVE_EPSILON_SECONDS {
        return Ok(false);
    }
    track.absolute_start_time = target;
    if let Some(tracks) = class.tracks.as_mut() {
        sort_by_start(tracks);
    }
    Ok(true)
}

/// Lift tracks stored on phases by older documents onto the class timeline.
///
/// Returns whether anything was migrated.
pub fn migrate_phase_tracks(class: &mut BreathworkClass) -> bool {
    let has_legacy = class
        .phases
        .iter()
        .any(|p| p.tracks.as_ref().is_some_and(|t| !t.is_empty()));
    if class.tracks.is_some() || !has_legacy {
        return false;
    }

    let mut migrated = Vec::new();
    let mut phase_start = 0.0;
    for phase in class.phases.iter_mut() {
        for mut track in phase.tracks.take().unwrap_or_default() {
            track.original_duration = Some(track.original_duration.unwrap_or(track.duration));
            track.absolute_start_time = phase_start + track.start_time;
            migrated.push(track);
        }
        phase_start += phase.seconds();
    }

    class.tracks = Some(migrated);
    true
}

/// Start and end of every phase, in order
pub fn phase_spans(class: &BreathworkClass) -> Vec<PhaseSpan> {
    let mut start = 0.0;
    class
        .phases
        .iter()
        .map(|phase| {
            let end = start + phase.seconds();
            let span = PhaseSpan {
                phase_id: phase.id.clone(),
                start,
                end,
            };
            start = end;
            span
        })
        .collect()
}
