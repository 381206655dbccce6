// Somara Domain
// Business logic for the Somara breathwork class builder

// Class editing, timeline, playback and the services persisting them
pub mod services;

// Spotify accounts service and Web API client
pub mod spotify;

// Authentication
pub mod auth;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the database module from somara-data for convenience
pub use somara_data::database;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
