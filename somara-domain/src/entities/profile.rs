use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// A user's profile and Spotify connection state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Profile {
    pub id: String,
    /// ID of the user in the auth provider
    pub user_id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub spotify_user_id: Option<String>,
    pub spotify_connected: bool,
    pub spotify_connected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Details recorded when a Spotify account is linked
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ConnectSpotifyRequest {
    #[validate(length(min = 1, message = "Spotify user id is required"))]
    pub spotify_user_id: String,
    pub display_name: Option<String>,
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: Option<String>,
}
