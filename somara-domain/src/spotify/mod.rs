//! Spotify accounts service and Web API client.
//!
//! Speaks the PKCE authorization-code flow against the accounts service and
//! reads users, playlists, tracks and audio features from the Web API.

pub mod auth;
pub mod client;
pub mod links;
pub mod mapping;
pub mod token;

use std::env;

use thiserror::Error;
use tracing::warn;

pub use auth::{callback_redirect, normalize_redirect_uri, AuthorizeRequest, SCOPES};
pub use client::SpotifyClient;
pub use links::{embed_url, extract_spotify_id, spotify_link_kind, SpotifyLinkKind};
pub use mapping::{PlaylistSummary, PlaylistTracks, SpotifyUser};
pub use token::{RefreshedToken, SpotifyToken};

pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com";
pub const DEFAULT_OEMBED_URL: &str = "https://open.spotify.com/oembed";
pub const DEFAULT_PUBLIC_ORIGIN: &str = "http://127.0.0.1:3000";
/// Request header carrying the listener's Spotify refresh token
pub const REFRESH_TOKEN_HEADER: &str = "x-spotify-refresh-token";

/// Errors that can occur talking to Spotify
#[derive(Debug, Error)]
pub enum SpotifyError {
    /// A required request value was not supplied
    #[error("{0}")]
    MissingParameter(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Spotify answered with a non-success status
    #[error("{message} ({status})")]
    Upstream {
        status: u16,
        message: String,
        details: String,
    },

    #[error("Invalid Spotify link: {0}")]
    InvalidLink(String),

    #[error("Failed to build authorization URL: {0}")]
    AuthUrl(String),

    #[error("Spotify request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Spotify client configuration
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    /// Explicit redirect URI; derived from `public_origin` when absent
    pub redirect_uri: Option<String>,
    pub public_origin: String,
    pub accounts_url: String,
    pub api_url: String,
    pub oembed_url: String,
}

impl SpotifyConfig {
    /// Read the configuration from `SPOTIFY_*` and `PUBLIC_ORIGIN`
    pub fn from_env() -> Self {
        let client_id = env::var("SPOTIFY_CLIENT_ID").unwrap_or_else(|_| {
            warn!("SPOTIFY_CLIENT_ID not set - Spotify login will not work");
            String::new()
        });

        Self {
            client_id,
            redirect_uri: env::var("SPOTIFY_REDIRECT_URI").ok().filter(|v| !v.is_empty()),
            public_origin: env::var("PUBLIC_ORIGIN").unwrap_or_else(|_| DEFAULT_PUBLIC_ORIGIN.to_string()),
            accounts_url: env::var("SPOTIFY_ACCOUNTS_URL").unwrap_or_else(|_| DEFAULT_ACCOUNTS_URL.to_string()),
            api_url: env::var("SPOTIFY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            oembed_url: env::var("SPOTIFY_OEMBED_URL").unwrap_or_else(|_| DEFAULT_OEMBED_URL.to_string()),
        }
    }

    /// Configuration pointing every endpoint at `base_url`, for tests and
    /// local stubs
    pub fn with_base_url(client_id: &str, base_url: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            redirect_uri: None,
            public_origin: DEFAULT_PUBLIC_ORIGIN.to_string(),
            accounts_url: base_url.to_string(),
            api_url: base_url.to_string(),
            oembed_url: format!("{}/oembed", base_url),
        }
    }

    /// Redirect URI to use when the caller supplies none
    pub fn default_redirect_uri(&self) -> String {
        normalize_redirect_uri(self.redirect_uri.as_deref(), &self.public_origin)
    }

    /// Check the configuration, returning every problem found
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.client_id.is_empty() {
            errors.push("SPOTIFY_CLIENT_ID is not configured".to_string());
        }
        for (name, value) in [
            ("SPOTIFY_ACCOUNTS_URL", &self.accounts_url),
            ("SPOTIFY_API_URL", &self.api_url),
            ("SPOTIFY_OEMBED_URL", &self.oembed_url),
            ("PUBLIC_ORIGIN", &self.public_origin),
        ] {
            if let Err(e) = url::Url::parse(value) {
                errors.push(format!("{} is not a valid URL: {}", name, e));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reports_missing_client_id() {
        let mut config = SpotifyConfig::with_base_url("", "http://127.0.0.1:9000");
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("SPOTIFY_CLIENT_ID"));

        config.client_id = "abc".to_string();
        config.api_url = "not a url".to_string();
        assert!(config.validate().unwrap_err()[0].contains("SPOTIFY_API_URL"));
    }

    #[test]
    fn test_default_redirect_uses_public_origin() {
        let config = SpotifyConfig::with_base_url("abc", "http://127.0.0.1:9000");
        assert_eq!(config.default_redirect_uri(), "http://127.0.0.1:3000/api/spotify/callback");
    }
}
