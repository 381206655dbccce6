use axum::{extract::State, Extension, Json};
use tracing::instrument;

use somara_domain::auth::logging::log_spotify_link;
use somara_domain::auth::UserInfo;
use somara_domain::entities::{ConnectSpotifyRequest, Profile};

use crate::api::routes::ProfileServiceRef;
use crate::entities::common::ErrorResponse;

/// Profile of the caller, created on first access
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile of the caller", body = Profile),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
#[instrument(skip(service, user))]
pub async fn get_profile(
    State(service): State<ProfileServiceRef>,
    Extension(user): Extension<UserInfo>,
) -> Result<Json<Profile>, ErrorResponse> {
    Ok(Json(service.get_current_profile(&user.user_id).await?))
}

/// Record the Spotify account linked to the caller
#[utoipa::path(
    post,
    path = "/api/v1/profile/spotify",
    request_body = ConnectSpotifyRequest,
    responses(
        (status = 200, description = "Spotify connected", body = Profile),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
#[instrument(skip(service, user))]
pub async fn connect_spotify(
    State(service): State<ProfileServiceRef>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<ConnectSpotifyRequest>,
) -> Result<Json<Profile>, ErrorResponse> {
    let profile = service.connect_spotify(&user.user_id, request).await?;
    log_spotify_link(&user.user_id, true);
    Ok(Json(profile))
}

#[utoipa::path(
    delete,
    path = "/api/v1/profile/spotify",
    responses(
        (status = 200, description = "Spotify disconnected", body = Profile)
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
#[instrument(skip(service, user))]
pub async fn disconnect_spotify(
    State(service): State<ProfileServiceRef>,
    Extension(user): Extension<UserInfo>,
) -> Result<Json<Profile>, ErrorResponse> {
    let profile = service.disconnect_spotify(&user.user_id).await?;
    log_spotify_link(&user.user_id, false);
    Ok(Json(profile))
}
