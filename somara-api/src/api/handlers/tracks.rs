use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{debug, instrument};

use somara_domain::auth::UserInfo;
use somara_domain::entities::PhaseTrack;
use somara_domain::services::timeline::pixels_to_seconds;
use somara_domain::services::{ClassServiceError, TrackChanges};

use crate::api::routes::ClassServiceRef;
use crate::entities::classes::{AddTrackRequest, MoveTrackRequest, MoveTrackResponse, ResizeTrackRequest};
use crate::entities::common::ErrorResponse;

/// Place a Spotify track on the class timeline
#[utoipa::path(
    post,
    path = "/api/v1/classes/{id}/tracks",
    params(("id" = String, Path, description = "Class ID")),
    request_body = AddTrackRequest,
    responses(
        (status = 201, description = "Track placed", body = PhaseTrack),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "tracks"
)]
#[instrument(skip(service, user, request))]
pub async fn add_track(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    Json(request): Json<AddTrackRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let track = service
        .add_track(&user.user_id, &id, request.track, request.start_time)
        .await?;
    Ok((StatusCode::CREATED, Json(track)))
}

/// Set a track's start and duration without snapping
#[utoipa::path(
    put,
    path = "/api/v1/classes/{id}/tracks/{track_id}",
    params(
        ("id" = String, Path, description = "Class ID"),
        ("track_id" = String, Path, description = "Timeline track ID")
    ),
    request_body = TrackChanges,
    responses(
        (status = 200, description = "Track updated", body = PhaseTrack),
        (status = 404, description = "Class or track not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "tracks"
)]
#[instrument(skip(service, user))]
pub async fn update_track(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path((id, track_id)): Path<(String, String)>,
    Json(changes): Json<TrackChanges>,
) -> Result<Json<PhaseTrack>, ErrorResponse> {
    Ok(Json(service.update_track(&user.user_id, &id, &track_id, changes).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/classes/{id}/tracks/{track_id}",
    params(
        ("id" = String, Path, description = "Class ID"),
        ("track_id" = String, Path, description = "Timeline track ID")
    ),
    responses(
        (status = 204, description = "Track removed"),
        (status = 404, description = "Class or track not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "tracks"
)]
#[instrument(skip(service, user))]
pub async fn remove_track(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path((id, track_id)): Path<(String, String)>,
) -> Result<StatusCode, ErrorResponse> {
    service.remove_track(&user.user_id, &id, &track_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Drop a dragged track; it lands on the nearest free position
#[utoipa::path(
    post,
    path = "/api/v1/classes/{id}/tracks/{track_id}/move",
    params(
        ("id" = String, Path, description = "Class ID"),
        ("track_id" = String, Path, description = "Timeline track ID")
    ),
    request_body = MoveTrackRequest,
    responses(
        (status = 200, description = "Drop handled", body = MoveTrackResponse),
        (status = 404, description = "Class or track not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "tracks"
)]
#[instrument(skip(service, user))]
pub async fn move_track(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path((id, track_id)): Path<(String, String)>,
    Json(request): Json<MoveTrackRequest>,
) -> Result<Json<MoveTrackResponse>, ErrorResponse> {
    let (class, moved) = service
        .move_track(&user.user_id, &id, &track_id, request.proposed_start)
        .await?;
    Ok(Json(MoveTrackResponse { moved, class }))
}

/// Drag one edge of a track
#[utoipa::path(
    post,
    path = "/api/v1/classes/{id}/tracks/{track_id}/resize",
    params(
        ("id" = String, Path, description = "Class ID"),
        ("track_id" = String, Path, description = "Timeline track ID")
    ),
    request_body = ResizeTrackRequest,
    responses(
        (status = 200, description = "Track resized", body = PhaseTrack),
        (status = 400, description = "No usable delta", body = ErrorResponse),
        (status = 404, description = "Class or track not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "tracks"
)]
#[instrument(skip(service, user))]
pub async fn resize_track(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path((id, track_id)): Path<(String, String)>,
    Json(request): Json<ResizeTrackRequest>,
) -> Result<Json<PhaseTrack>, ErrorResponse> {
    let delta = match (request.delta_seconds, request.delta_px, request.width_px) {
        (Some(seconds), _, _) => seconds,
        (None, Some(px), Some(width)) => {
            let class = service.get_class(&user.user_id, &id).await?;
            pixels_to_seconds(px, width, class.timeline_seconds()).map_err(ClassServiceError::from)?
        }
        _ => {
            return Err(ErrorResponse::bad_request(
                "Provide deltaSeconds, or deltaPx together with widthPx",
            ))
        }
    };
    debug!("Resizing {} edge by {:.2}s", track_id, delta);

    let track = service
        .resize_track(&user.user_id, &id, &track_id, request.edge, delta)
        .await?;
    Ok(Json(track))
}
