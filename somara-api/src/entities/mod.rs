// Public entities for the Somara API
// Request and response bodies that only exist at the HTTP boundary

// Error responses shared by every handler
pub mod common;

// Class editor request bodies
pub mod classes;

// Spotify proxy bodies
pub mod spotify;
