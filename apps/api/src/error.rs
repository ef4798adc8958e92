use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rolegate_core::AppError;
use serde::Serialize;

/// API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    permission_codes: Option<Vec<String>>,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            AppError::ScopeMismatch { .. } => (StatusCode::BAD_REQUEST, "scope_mismatch"),
            AppError::UnknownPermissions(_) => (StatusCode::BAD_REQUEST, "unknown_permissions"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::DuplicateRole { .. } => (StatusCode::CONFLICT, "duplicate_role"),
            AppError::RoleInUse { .. } => (StatusCode::CONFLICT, "role_in_use"),
            AppError::UnknownUser(_) => (StatusCode::INTERNAL_SERVER_ERROR, "unknown_user"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        let permission_codes = match &self.0 {
            AppError::UnknownPermissions(codes) => Some(codes.clone()),
            _ => None,
        };

        let payload = Json(ErrorResponse {
            code,
            message: self.0.to_string(),
            permission_codes,
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
