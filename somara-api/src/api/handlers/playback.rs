use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use tracing::instrument;

use somara_domain::auth::UserInfo;
use somara_domain::services::PlaybackStatus;

use crate::api::routes::ClassServiceRef;
use crate::entities::classes::PlaybackQuery;
use crate::entities::common::ErrorResponse;

/// Phase, breath cue and track at `t` seconds into the class
#[utoipa::path(
    get,
    path = "/api/v1/classes/{id}/playback",
    params(
        ("id" = String, Path, description = "Class ID"),
        PlaybackQuery
    ),
    responses(
        (status = 200, description = "Playback snapshot", body = PlaybackStatus),
        (status = 400, description = "Invalid time", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "playback"
)]
#[instrument(skip(service, user))]
pub async fn playback_status(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    Query(query): Query<PlaybackQuery>,
) -> Result<Json<PlaybackStatus>, ErrorResponse> {
    let t = query.t.unwrap_or(0.0);
    if !t.is_finite() {
        return Err(ErrorResponse::bad_request("t must be a number of seconds"));
    }
    Ok(Json(service.playback_status(&user.user_id, &id, t).await?))
}
