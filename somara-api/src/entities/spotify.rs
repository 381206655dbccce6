//! Request and response bodies of the `/api/spotify` proxy routes.
//!
//! These keep the field names the Spotify accounts service uses
//! (`code_verifier`, `refresh_token`) so browser code can forward them as is.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use somara_domain::spotify::{PlaylistSummary, SpotifyError};

#[derive(Debug, Deserialize, IntoParams)]
pub struct AuthorizeQuery {
    /// Redirect URI registered with Spotify; defaults to this server's callback
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub code: Option<String>,
    pub code_verifier: Option<String>,
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PlaylistQuery {
    /// Spotify playlist ID
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PlaylistInfoQuery {
    /// Link to a playlist, album or track on open.spotify.com
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaylistsResponse {
    pub playlists: Vec<PlaylistSummary>,
}

/// Error body of the Spotify routes: `{error, details?}` with the status
/// Spotify answered with
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SpotifyErrorResponse {
    #[serde(skip)]
    pub status: u16,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<SpotifyError> for SpotifyErrorResponse {
    fn from(err: SpotifyError) -> Self {
        let (status, error, details) = match err {
            SpotifyError::MissingParameter(msg) => (400, msg, None),
            SpotifyError::Unauthorized(msg) => (401, msg, None),
            SpotifyError::Upstream { status, message, details } => (status, message, Some(details)),
            SpotifyError::InvalidLink(url) => (400, "Invalid Spotify link".to_string(), Some(url)),
            SpotifyError::AuthUrl(msg) => (500, "Failed to build authorization URL".to_string(), Some(msg)),
            SpotifyError::Http(e) => (502, "Spotify request failed".to_string(), Some(e.to_string())),
        };
        Self { status, error, details }
    }
}

impl IntoResponse for SpotifyErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_is_kept() {
        let response = SpotifyErrorResponse::from(SpotifyError::Upstream {
            status: 429,
            message: "Failed to fetch playlists".to_string(),
            details: "rate limited".to_string(),
        });
        assert_eq!(response.status, 429);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"error": "Failed to fetch playlists", "details": "rate limited"})
        );
    }

    #[test]
    fn test_missing_parameter_is_bad_request() {
        let response =
            SpotifyErrorResponse::from(SpotifyError::MissingParameter("Missing refresh_token".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
