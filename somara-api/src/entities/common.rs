use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use somara_domain::services::{ClassServiceError, ProfileServiceError};

/// Error response format for API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }

    pub fn internal_error() -> Self {
        Self::new("internal_error", "An unexpected error occurred")
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ClassServiceError> for ErrorResponse {
    fn from(err: ClassServiceError) -> Self {
        match err {
            ClassServiceError::ValidationError(msg) => Self::validation_error(msg),
            ClassServiceError::NotFound(msg) => Self::not_found(msg),
            ClassServiceError::RepositoryError(_) | ClassServiceError::SerializationError(_) => {
                error!("Class service failure: {}", err);
                Self::internal_error()
            }
        }
    }
}

impl From<ProfileServiceError> for ErrorResponse {
    fn from(err: ProfileServiceError) -> Self {
        match err {
            ProfileServiceError::ValidationError(msg) => Self::validation_error(msg),
            ProfileServiceError::RepositoryError(_) => {
                error!("Profile service failure: {}", err);
                Self::internal_error()
            }
        }
    }
}
