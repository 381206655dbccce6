//! Proxy routes for the Spotify accounts service and Web API.
//!
//! Requests carry the listener's Spotify access token as their bearer
//! token. Routes that may refresh it mid-request also read the refresh
//! token from [`REFRESH_TOKEN_HEADER`].

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    Json,
};
use tracing::{info, instrument};

use somara_domain::auth::bearer_token;
use somara_domain::auth::logging::{log_authorization_denied, log_spotify_exchange, log_spotify_refresh};
use somara_domain::entities::SpotifyPlaylist;
use somara_domain::spotify::{
    callback_redirect, AuthorizeRequest, PlaylistTracks, RefreshedToken, SpotifyUser, REFRESH_TOKEN_HEADER,
};

use crate::api::routes::SpotifyClientRef;
use crate::entities::spotify::{
    AuthorizeQuery, CallbackQuery, PlaylistInfoQuery, PlaylistQuery, PlaylistsResponse, RefreshRequest,
    SpotifyErrorResponse, TokenRequest,
};

fn refresh_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(REFRESH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// Start the PKCE authorization-code flow
#[utoipa::path(
    get,
    path = "/api/spotify/authorize",
    params(AuthorizeQuery),
    responses(
        (status = 200, description = "Authorize URL with its code verifier and state", body = AuthorizeRequest)
    ),
    tag = "spotify"
)]
#[instrument(skip(client))]
pub async fn authorize(
    State(client): State<SpotifyClientRef>,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Json<AuthorizeRequest>, SpotifyErrorResponse> {
    Ok(Json(client.authorize(query.redirect_uri.as_deref())?))
}

/// Exchange an authorization code; Spotify's token JSON is passed through
#[utoipa::path(
    post,
    path = "/api/spotify/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Spotify token response", body = serde_json::Value),
        (status = 400, description = "Missing code or code_verifier", body = SpotifyErrorResponse)
    ),
    tag = "spotify"
)]
#[instrument(skip(client, request))]
pub async fn exchange_token(
    State(client): State<SpotifyClientRef>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<serde_json::Value>, SpotifyErrorResponse> {
    let result = client
        .exchange_code(
            request.code.as_deref(),
            request.code_verifier.as_deref(),
            request.redirect_uri.as_deref(),
        )
        .await;
    match result {
        Ok(token) => {
            log_spotify_exchange(true, None);
            Ok(Json(token))
        }
        Err(e) => {
            log_spotify_exchange(false, Some(&e.to_string()));
            Err(e.into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/spotify/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshedToken),
        (status = 400, description = "Missing refresh_token", body = SpotifyErrorResponse)
    ),
    tag = "spotify"
)]
#[instrument(skip(client, request))]
pub async fn refresh_token(
    State(client): State<SpotifyClientRef>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshedToken>, SpotifyErrorResponse> {
    match client.refresh(request.refresh_token.as_deref()).await {
        Ok(token) => {
            log_spotify_refresh(true, None);
            Ok(Json(token))
        }
        Err(e) => {
            log_spotify_refresh(false, Some(&e.to_string()));
            Err(e.into())
        }
    }
}

/// Spotify redirects here after the consent screen
#[utoipa::path(
    get,
    path = "/api/spotify/callback",
    params(CallbackQuery),
    responses(
        (status = 303, description = "Redirect to the app with the code or the error")
    ),
    tag = "spotify"
)]
#[instrument]
pub async fn callback(Query(query): Query<CallbackQuery>) -> Redirect {
    if let Some(error) = &query.error {
        log_authorization_denied(error);
    }
    Redirect::to(&callback_redirect(query.code.as_deref(), query.error.as_deref()))
}

#[utoipa::path(
    get,
    path = "/api/spotify/user",
    responses(
        (status = 200, description = "Spotify account of the token owner", body = SpotifyUser),
        (status = 401, description = "Missing or expired token", body = SpotifyErrorResponse)
    ),
    security(("spotify" = [])),
    tag = "spotify"
)]
#[instrument(skip(client, headers))]
pub async fn current_user(
    State(client): State<SpotifyClientRef>,
    headers: HeaderMap,
) -> Result<Json<SpotifyUser>, SpotifyErrorResponse> {
    Ok(Json(client.current_user(bearer_token(&headers)).await?))
}

#[utoipa::path(
    get,
    path = "/api/spotify/playlists",
    responses(
        (status = 200, description = "Playlists in the listener's library", body = PlaylistsResponse),
        (status = 401, description = "Missing or expired token", body = SpotifyErrorResponse)
    ),
    security(("spotify" = [])),
    tag = "spotify"
)]
#[instrument(skip(client, headers))]
pub async fn playlists(
    State(client): State<SpotifyClientRef>,
    headers: HeaderMap,
) -> Result<Json<PlaylistsResponse>, SpotifyErrorResponse> {
    let playlists = client.user_playlists(bearer_token(&headers)).await?;
    info!("Returning {} playlists", playlists.len());
    Ok(Json(PlaylistsResponse { playlists }))
}

/// A playlist with every track and the audio features Spotify provides
#[utoipa::path(
    get,
    path = "/api/spotify/playlist",
    params(PlaylistQuery),
    responses(
        (status = 200, description = "Playlist, tracks and audio features", body = serde_json::Value),
        (status = 400, description = "Missing playlist ID or access token", body = SpotifyErrorResponse)
    ),
    security(("spotify" = [])),
    tag = "spotify"
)]
#[instrument(skip(client, headers))]
pub async fn playlist(
    State(client): State<SpotifyClientRef>,
    headers: HeaderMap,
    Query(query): Query<PlaylistQuery>,
) -> Result<Json<PlaylistTracks>, SpotifyErrorResponse> {
    let id = query.id.unwrap_or_default();
    let details = client
        .playlist_with_tracks(&id, bearer_token(&headers), refresh_header(&headers))
        .await?;
    Ok(Json(details))
}

/// Resolve a pasted Spotify link into a playlist for a class
#[utoipa::path(
    get,
    path = "/api/spotify/playlist-info",
    params(PlaylistInfoQuery),
    responses(
        (status = 200, description = "Playlist details", body = SpotifyPlaylist),
        (status = 400, description = "Not a Spotify link", body = SpotifyErrorResponse)
    ),
    tag = "spotify"
)]
#[instrument(skip(client, headers))]
pub async fn playlist_info(
    State(client): State<SpotifyClientRef>,
    headers: HeaderMap,
    Query(query): Query<PlaylistInfoQuery>,
) -> Result<Json<SpotifyPlaylist>, SpotifyErrorResponse> {
    let playlist = client
        .playlist_info(&query.url, bearer_token(&headers), refresh_header(&headers))
        .await?;
    Ok(Json(playlist))
}
