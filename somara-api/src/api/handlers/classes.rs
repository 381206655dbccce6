use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, instrument};

use somara_domain::auth::UserInfo;
use somara_domain::entities::{BreathworkClass, CreateClassRequest, UpdateClassRequest};

use crate::api::routes::ClassServiceRef;
use crate::entities::common::ErrorResponse;

/// List the caller's classes, most recently updated first
#[utoipa::path(
    get,
    path = "/api/v1/classes",
    responses(
        (status = 200, description = "Classes of the caller", body = [BreathworkClass]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "classes"
)]
#[instrument(skip(service, user))]
pub async fn list_classes(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
) -> Result<Json<Vec<BreathworkClass>>, ErrorResponse> {
    let classes = service.list_classes(&user.user_id).await?;
    info!("Listed {} classes for {}", classes.len(), user.user_id);
    Ok(Json(classes))
}

/// Create a class with the default introduction and integration phases
#[utoipa::path(
    post,
    path = "/api/v1/classes",
    request_body = CreateClassRequest,
    responses(
        (status = 201, description = "Class created", body = BreathworkClass),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "classes"
)]
#[instrument(skip(service, user))]
pub async fn create_class(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<CreateClassRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let class = service.create_class(&user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    get,
    path = "/api/v1/classes/{id}",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class found", body = BreathworkClass),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "classes"
)]
#[instrument(skip(service, user))]
pub async fn get_class(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> Result<Json<BreathworkClass>, ErrorResponse> {
    Ok(Json(service.get_class(&user.user_id, &id).await?))
}

/// Store a whole class document under `id`
#[utoipa::path(
    put,
    path = "/api/v1/classes/{id}",
    params(("id" = String, Path, description = "Class ID")),
    request_body = BreathworkClass,
    responses(
        (status = 200, description = "Class saved", body = BreathworkClass),
        (status = 400, description = "Invalid class", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "classes"
)]
#[instrument(skip(service, user, class))]
pub async fn save_class(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    Json(mut class): Json<BreathworkClass>,
) -> Result<Json<BreathworkClass>, ErrorResponse> {
    class.id = id;
    Ok(Json(service.save_class(&user.user_id, class).await?))
}

/// Change header fields; `null` clears an optional field
#[utoipa::path(
    patch,
    path = "/api/v1/classes/{id}",
    params(("id" = String, Path, description = "Class ID")),
    request_body = UpdateClassRequest,
    responses(
        (status = 200, description = "Class updated", body = BreathworkClass),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "classes"
)]
#[instrument(skip(service, user, changes))]
pub async fn update_class_details(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    Json(changes): Json<UpdateClassRequest>,
) -> Result<Json<BreathworkClass>, ErrorResponse> {
    Ok(Json(service.update_class_details(&user.user_id, &id, changes).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/classes/{id}",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "classes"
)]
#[instrument(skip(service, user))]
pub async fn delete_class(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    service.delete_class(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/classes/{id}/duplicate",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 201, description = "Copy created", body = BreathworkClass),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "classes"
)]
#[instrument(skip(service, user))]
pub async fn duplicate_class(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let copy = service.duplicate_class(&user.user_id, &id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Download the class as a JSON file
#[utoipa::path(
    get,
    path = "/api/v1/classes/{id}/export",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class document", content_type = "application/json", body = BreathworkClass),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "classes"
)]
#[instrument(skip(service, user))]
pub async fn export_class(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let json = service.export_class(&user.user_id, &id).await?;
    let disposition = format!("attachment; filename=\"breathwork-class-{}.json\"", id);
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        json,
    ))
}

/// Import an exported class document as a new class
#[utoipa::path(
    post,
    path = "/api/v1/classes/import",
    request_body(content = String, description = "Exported class JSON", content_type = "application/json"),
    responses(
        (status = 201, description = "Class imported", body = BreathworkClass),
        (status = 400, description = "Not a class document", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "classes"
)]
#[instrument(skip(service, user, body))]
pub async fn import_class(
    State(service): State<ClassServiceRef>,
    Extension(user): Extension<UserInfo>,
    body: String,
) -> Result<impl IntoResponse, ErrorResponse> {
    let class = service.import_class(&user.user_id, &body).await?;
    info!("Imported class {} for {}", class.id, user.user_id);
    Ok((StatusCode::CREATED, Json(class)))
}
