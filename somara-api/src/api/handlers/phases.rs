use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::instrument;

use somara_domain::auth::UserInfo;
use somara_domain::entities::{BreathworkClass, BreathworkPhase, PhaseChanges};

use crate::api::routes::ClassServiceRef;
use crate::entities::classes::{AddPhaseRequest, ReorderPhasesRequest};
use crate::entities::common::ErrorResponse;

/// Insert a phase before the integration phase
#[utoipa::path(
    post,
    path = "/api/v1/classes/{id}/phases",
    params(("id" = String, Path, description = "Class ID")),
    request_body = AddPhaseRequest,
    responses(
        (status = 201, description = "Phase added", body = BreathworkClass),
        (status = 400, description = "Fixed phase types cannot be added", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "phases"
)]
#[instrument(skip(service, user))]
pub async fn add_phase(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    Json(request): Json<AddPhaseRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let class = service.add_phase(&user.user_id, &id, request.phase_type).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    put,
    path = "/api/v1/classes/{id}/phases/{phase_id}",
    params(
        ("id" = String, Path, description = "Class ID"),
        ("phase_id" = String, Path, description = "Phase ID")
    ),
    request_body = PhaseChanges,
    responses(
        (status = 200, description = "Phase updated", body = BreathworkPhase),
        (status = 400, description = "Invalid changes", body = ErrorResponse),
        (status = 404, description = "Class or phase not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "phases"
)]
#[instrument(skip(service, user, changes))]
pub async fn update_phase(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path((id, phase_id)): Path<(String, String)>,
    Json(changes): Json<PhaseChanges>,
) -> Result<Json<BreathworkPhase>, ErrorResponse> {
    Ok(Json(service.update_phase(&user.user_id, &id, &phase_id, changes).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/classes/{id}/phases/{phase_id}",
    params(
        ("id" = String, Path, description = "Class ID"),
        ("phase_id" = String, Path, description = "Phase ID")
    ),
    responses(
        (status = 200, description = "Phase deleted", body = BreathworkClass),
        (status = 400, description = "Fixed phases cannot be deleted", body = ErrorResponse),
        (status = 404, description = "Class or phase not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "phases"
)]
#[instrument(skip(service, user))]
pub async fn delete_phase(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path((id, phase_id)): Path<(String, String)>,
) -> Result<Json<BreathworkClass>, ErrorResponse> {
    Ok(Json(service.delete_phase(&user.user_id, &id, &phase_id).await?))
}

/// Move a phase to where another one sits
#[utoipa::path(
    post,
    path = "/api/v1/classes/{id}/phases/reorder",
    params(("id" = String, Path, description = "Class ID")),
    request_body = ReorderPhasesRequest,
    responses(
        (status = 200, description = "Phases reordered", body = BreathworkClass),
        (status = 400, description = "Fixed phases cannot be moved", body = ErrorResponse),
        (status = 404, description = "Class or phase not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "phases"
)]
#[instrument(skip(service, user))]
pub async fn reorder_phases(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    Json(request): Json<ReorderPhasesRequest>,
) -> Result<Json<BreathworkClass>, ErrorResponse> {
    let class = service
        .reorder_phases(&user.user_id, &id, &request.active_id, &request.over_id)
        .await?;
    Ok(Json(class))
}
