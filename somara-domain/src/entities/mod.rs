// Domain entities and value objects
pub mod class;
pub mod conversions;
pub mod profile;
pub mod rhythm;
pub mod track;

// Re-export common types for easier imports
pub use class::{
    BreathworkClass, BreathworkPhase, CreateClassRequest, PhaseChanges, PhaseType, UpdateClassRequest,
};
pub use profile::{ConnectSpotifyRequest, Profile};
pub use rhythm::{BreathCue, BreathingRhythm, BreathingType};
pub use track::{PhaseTrack, SpotifyPlaylist, SpotifyTrack, TrackFeatures};
