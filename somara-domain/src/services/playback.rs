//! Guided playback of a class.
//!
//! The session owns no clock: callers advance it with [`PlaybackSession::tick`]
//! or feed it positions reported by an external player, then ask
//! [`PlaybackSession::next_command`] what that player should do.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::class::BreathworkClass;
use crate::entities::rhythm::BreathCue;
use crate::entities::track::PhaseTrack;
use super::timeline;

/// Preview clips are cut after this many seconds
pub const PREVIEW_LIMIT_SECONDS: f64 = 30.0;
pub const DEFAULT_SKIP_SECONDS: f64 = 5.0;

/// Phase under the playhead and time spent in it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhasePosition {
    pub index: usize,
    pub elapsed: f64,
}

/// Locate the phase playing at `seconds`.
///
/// Times past the end resolve to the last phase, fully elapsed.
pub fn phase_at(class: &BreathworkClass, seconds: f64) -> Option<PhasePosition> {
    let last = class.phases.len().checked_sub(1)?;
    let mut start = 0.0;
    for (index, phase) in class.phases.iter().enumerate() {
        let length = phase.seconds();
        if seconds < start + length {
            return Some(PhasePosition {
                index,
                elapsed: (seconds - start).max(0.0),
            });
        }
        start += length;
    }
    Some(PhasePosition {
        index: last,
        elapsed: class.phases[last].seconds(),
    })
}

/// Percentage of a phase already played
pub fn phase_progress(class: &BreathworkClass, position: PhasePosition) -> f64 {
    match class.phases.get(position.index) {
        Some(phase) if phase.seconds() > 0.0 => position.elapsed / phase.seconds() * 100.0,
        _ => 0.0,
    }
}

/// Track playing at `seconds`, if any
pub fn track_at(tracks: &[PhaseTrack], seconds: f64) -> Option<&PhaseTrack> {
    tracks.iter().find(|t| t.contains(seconds))
}

/// Offset into a preview clip for a position inside the full track
pub fn preview_offset(seconds_into_track: f64) -> f64 {
    seconds_into_track.clamp(0.0, PREVIEW_LIMIT_SECONDS)
}

/// Instruction for the external audio player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PlayerCommand {
    Pause,
    #[serde(rename_all = "camelCase")]
    Load {
        /// Placed track ID
        track_id: String,
        spotify_track_id: String,
        position_ms: u64,
        /// Position to use when only the preview clip can be played
        preview_position_seconds: f64,
    },
    Resume,
}

/// Snapshot of a session for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub current_time: f64,
    pub total_time: f64,
    pub progress: f64,
    pub phase_index: Option<usize>,
    pub phase_name: Option<String>,
    pub phase_progress: f64,
    pub breath_cue: Option<BreathCue>,
    pub current_track: Option<PhaseTrack>,
    pub is_playing: bool,
    pub is_repeating: bool,
}

#[derive(Debug, Clone)]
pub struct PlaybackSession {
    class: BreathworkClass,
    tracks: Vec<PhaseTrack>,
    current_time: f64,
    playing: bool,
    loaded_track: Option<String>,
    skip_seconds: f64,
    repeat: bool,
}

impl PlaybackSession {
    /// Start a session at the beginning of `class`. Legacy phase tracks are
    /// lifted onto the timeline first.
    pub fn new(mut class: BreathworkClass) -> Self {
        timeline::migrate_phase_tracks(&mut class);
        let tracks = timeline::sorted_tracks(&class);
        Self {
            class,
            tracks,
            current_time: 0.0,
            playing: false,
            loaded_track: None,
            skip_seconds: DEFAULT_SKIP_SECONDS,
            repeat: false,
        }
    }

    pub fn total_seconds(&self) -> f64 {
        self.class.timeline_seconds()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_skip_seconds(&mut self, seconds: f64) {
        self.skip_seconds = seconds.max(0.0);
    }

    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }

    pub fn current_track(&self) -> Option<&PhaseTrack> {
        track_at(&self.tracks, self.current_time)
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.current_time = 0.0;
        self.loaded_track = None;
    }

    /// Advance the clock by `dt` seconds while playing
    pub fn tick(&mut self, dt: f64) {
        if !self.playing {
            return;
        }

        let total = self.total_seconds();
        let mut next = self.current_time + dt;

        if self.repeat {
            if let Some(track) = self.current_track() {
                if next >= track.end_time() {
                    next = track.absolute_start_time;
                }
            }
        }

        if next >= total {
            self.current_time = total;
            self.playing = false;
        } else {
            self.current_time = next;
        }
    }

    pub fn seek(&mut self, seconds: f64) {
        self.current_time = seconds.clamp(0.0, self.total_seconds().max(0.0));
    }

    /// Jump back by the skip amount. Returns the in-track seek in
    /// milliseconds when the playhead stays inside the current track.
    pub fn skip_backward(&mut self) -> Option<u64> {
        let target = (self.current_time - self.skip_seconds).max(0.0);
        self.skip_to(target)
    }

    pub fn skip_forward(&mut self) -> Option<u64> {
        let target = (self.current_time + self.skip_seconds).min(self.total_seconds());
        self.skip_to(target)
    }

    fn skip_to(&mut self, target: f64) -> Option<u64> {
        let seek = self.current_track().and_then(|track| {
            let into = target - track.absolute_start_time;
            (into >= 0.0 && into < track.duration).then(|| to_millis(into))
        });
        self.current_time = target;
        seek
    }

    /// Follow the position reported by the external player for the track
    /// under the playhead.
    pub fn sync_player(&mut self, position_ms: u64, paused: bool) {
        if let Some(track) = self.current_track().cloned() {
            let into = position_ms as f64 / 1000.0;
            if into >= track.duration {
                let next = self
                    .tracks
                    .iter()
                    .find(|t| t.absolute_start_time > track.absolute_start_time)
                    .map(|t| t.absolute_start_time);
                match next {
                    Some(start) => {
                        debug!("Track {} finished, moving to next at {}s", track.id, start);
                        self.current_time = start;
                        self.loaded_track = None;
                    }
                    None => {
                        self.current_time = track.end_time();
                        self.playing = false;
                        return;
                    }
                }
            } else {
                self.current_time = track.absolute_start_time + into;
            }
        }
        self.playing = !paused;
    }

    /// What the external player should be doing right now. A `Load` marks
    /// the track as loaded.
    pub fn next_command(&mut self) -> PlayerCommand {
        if !self.playing {
            return PlayerCommand::Pause;
        }
        let Some(track) = self.current_track().cloned() else {
            return PlayerCommand::Pause;
        };

        if self.loaded_track.as_deref() == Some(track.id.as_str()) {
            return PlayerCommand::Resume;
        }

        let into = (self.current_time - track.absolute_start_time).max(0.0);
        self.loaded_track = Some(track.id.clone());
        PlayerCommand::Load {
            track_id: track.id,
            spotify_track_id: track.track_id,
            position_ms: to_millis(into),
            preview_position_seconds: preview_offset(into),
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        let total = self.total_seconds();
        let position = phase_at(&self.class, self.current_time);
        let phase = position.and_then(|p| self.class.phases.get(p.index));

        let breath_cue = match (phase, position) {
            (Some(phase), Some(position)) => phase
                .breathing_rhythm
                .as_ref()
                .map(|rhythm| rhythm.cue_at(position.elapsed)),
            _ => None,
        };

        PlaybackStatus {
            current_time: self.current_time,
            total_time: total,
            progress: if total > 0.0 { self.current_time / total * 100.0 } else { 0.0 },
            phase_index: position.map(|p| p.index),
            phase_name: phase.map(|p| p.name.clone()),
            phase_progress: position.map(|p| phase_progress(&self.class, p)).unwrap_or(0.0),
            breath_cue,
            current_track: self.current_track().cloned(),
            is_playing: self.playing,
            is_repeating: self.repeat,
        }
    }
}

fn to_millis(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::class::{BreathworkPhase, PhaseType};
    use crate::entities::rhythm::{BreathingRhythm, BreathingType};
    use crate::entities::track::TrackFeatures;
    use pretty_assertions::assert_eq;

    fn phase(id: &str, phase_type: PhaseType, minutes: u32) -> BreathworkPhase {
        BreathworkPhase {
            id: id.to_string(),
            phase_type,
            name: phase_type.default_name().to_string(),
            duration: minutes,
            breathing_rhythm: None,
            breath_hold_duration: None,
            custom_type_name: None,
            grounding_instructions: None,
            tracks: None,
        }
    }

    fn placed(id: &str, start: f64, duration: f64) -> PhaseTrack {
        PhaseTrack {
            id: id.to_string(),
            track_id: format!("spotify-{}", id),
            track_name: id.to_string(),
            artist: "Artist".to_string(),
            duration,
            original_duration: Some(duration),
            start_time: 0.0,
            absolute_start_time: start,
            image_url: None,
            preview_url: None,
            features: TrackFeatures::default(),
        }
    }

    /// Intro 1 min, box breathing 2 min, integration 1 min. Tracks at
    /// 0..60 and 100..200.
    fn class() -> BreathworkClass {
        let mut breathing = phase("p2", PhaseType::Breathing, 2);
        breathing.breathing_rhythm = Some(BreathingRhythm::preset(BreathingType::BoxBreathing));

        let mut class = BreathworkClass::new("c1");
        class.phases = vec![
            phase("p1", PhaseType::Introduction, 1),
            breathing,
            phase("p3", PhaseType::Integration, 1),
        ];
        class.total_duration = 4;
        class.tracks = Some(vec![placed("b", 100.0, 100.0), placed("a", 0.0, 60.0)]);
        class
    }

    #[test]
    fn test_phase_at_walks_phases() {
        let class = class();
        assert_eq!(phase_at(&class, 30.0), Some(PhasePosition { index: 0, elapsed: 30.0 }));
        assert_eq!(phase_at(&class, 60.0), Some(PhasePosition { index: 1, elapsed: 0.0 }));
        assert_eq!(phase_at(&class, 1000.0), Some(PhasePosition { index: 2, elapsed: 60.0 }));
        assert_eq!(phase_at(&BreathworkClass::new("empty"), 10.0), None);
    }

    #[test]
    fn test_track_at_uses_half_open_ranges() {
        let class = class();
        let tracks = class.timeline_tracks();
        assert_eq!(track_at(tracks, 59.9).map(|t| t.id.as_str()), Some("a"));
        assert_eq!(track_at(tracks, 60.0), None);
        assert_eq!(track_at(tracks, 100.0).map(|t| t.id.as_str()), Some("b"));
    }

    #[test]
    fn test_tick_stops_at_end() {
        let mut session = PlaybackSession::new(class());
        session.tick(10.0);
        assert_eq!(session.current_time(), 0.0);

        session.play();
        session.tick(10.0);
        assert_eq!(session.current_time(), 10.0);

        session.seek(235.0);
        session.tick(10.0);
        assert_eq!(session.current_time(), 240.0);
        assert!(!session.is_playing());
    }

    #[test]
    fn test_repeat_restarts_current_track() {
        let mut session = PlaybackSession::new(class());
        session.set_repeat(true);
        session.play();
        session.seek(59.5);
        session.tick(1.0);
        assert_eq!(session.current_time(), 0.0);
    }

    #[test]
    fn test_skip_returns_seek_inside_track() {
        let mut session = PlaybackSession::new(class());
        session.seek(110.0);
        assert_eq!(session.skip_forward(), Some(15_000));
        assert_eq!(session.current_time(), 115.0);

        session.seek(2.0);
        assert_eq!(session.skip_backward(), Some(0));
        assert_eq!(session.current_time(), 0.0);

        session.seek(58.0);
        assert_eq!(session.skip_forward(), None);
        assert_eq!(session.current_time(), 63.0);
    }

    #[test]
    fn test_custom_skip_amount() {
        let mut session = PlaybackSession::new(class());
        session.set_skip_seconds(30.0);
        session.seek(110.0);
        assert_eq!(session.skip_forward(), Some(40_000));
        assert_eq!(session.current_time(), 140.0);

        session.set_skip_seconds(-5.0);
        assert_eq!(session.skip_backward(), Some(40_000));
        assert_eq!(session.current_time(), 140.0);
    }

    #[test]
    fn test_next_command_loads_once() {
        let mut session = PlaybackSession::new(class());
        assert_eq!(session.next_command(), PlayerCommand::Pause);

        session.play();
        session.seek(130.0);
        assert_eq!(
            session.next_command(),
            PlayerCommand::Load {
                track_id: "b".to_string(),
                spotify_track_id: "spotify-b".to_string(),
                position_ms: 30_000,
                preview_position_seconds: 30.0,
            }
        );
        assert_eq!(session.next_command(), PlayerCommand::Resume);

        session.seek(80.0);
        assert_eq!(session.next_command(), PlayerCommand::Pause);
    }

    #[test]
    fn test_sync_moves_to_next_track_when_finished() {
        let mut session = PlaybackSession::new(class());
        session.play();
        session.seek(10.0);
        session.next_command();

        session.sync_player(20_000, false);
        assert_eq!(session.current_time(), 20.0);

        session.sync_player(60_000, false);
        assert_eq!(session.current_time(), 100.0);
        assert!(matches!(session.next_command(), PlayerCommand::Load { .. }));

        session.sync_player(100_000, false);
        assert_eq!(session.current_time(), 200.0);
        assert!(!session.is_playing());
    }

    #[test]
    fn test_sync_follows_player_pause() {
        let mut session = PlaybackSession::new(class());
        session.play();
        session.seek(110.0);

        session.sync_player(30_000, true);
        assert!(!session.is_playing());
        assert_eq!(session.current_time(), 130.0);
        assert!(matches!(session.next_command(), PlayerCommand::Pause));

        session.sync_player(31_000, false);
        assert!(session.is_playing());
        assert_eq!(session.current_time(), 131.0);
    }

    #[test]
    fn test_sync_between_tracks_only_updates_playing_flag() {
        let mut session = PlaybackSession::new(class());
        session.seek(80.0);

        session.sync_player(5_000, false);
        assert!(session.is_playing());
        assert_eq!(session.current_time(), 80.0);

        session.sync_player(5_000, true);
        assert!(!session.is_playing());
        assert_eq!(session.current_time(), 80.0);
    }

    #[test]
    fn test_status_reports_breath_cue() {
        let mut session = PlaybackSession::new(class());
        session.seek(65.0);
        let status = session.status();
        assert_eq!(status.phase_index, Some(1));
        assert_eq!(status.phase_name.as_deref(), Some("Breathing"));
        assert_eq!(status.breath_cue, Some(BreathCue::HoldIn));
        assert_eq!(status.current_track, None);

        session.seek(0.0);
        assert_eq!(session.status().breath_cue, None);
    }

    #[test]
    fn test_stop_resets() {
        let mut session = PlaybackSession::new(class());
        session.play();
        session.seek(30.0);
        session.next_command();
        session.stop();
        assert_eq!(session.current_time(), 0.0);
        assert_eq!(session.next_command(), PlayerCommand::Pause);
        session.play();
        assert!(matches!(session.next_command(), PlayerCommand::Load { .. }));
    }
}
