use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::backend::BackendError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    BadGateway(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg).into_response(),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(value: BackendError) -> Self {
        match value {
            BackendError::NoEndpoint(_) => ApiError::NotFound(value.to_string()),
            BackendError::Status(404) => ApiError::NotFound("Tutor not found".into()),
            BackendError::Status(400) | BackendError::Status(422) => {
                ApiError::BadRequest(value.to_string())
            }
            BackendError::Status(409) => ApiError::Conflict(value.to_string()),
            BackendError::Url(_) | BackendError::CannotBeBase(_) => {
                error!("Backend misconfigured: {value}");
                ApiError::Internal("Backend is misconfigured".into())
            }
            BackendError::Http(err) => {
                error!("HTTP error: {err}");
                ApiError::BadGateway("Failed to reach backend".into())
            }
            BackendError::UnexpectedBody(_) | BackendError::Status(_) => {
                error!("Backend error: {value}");
                ApiError::BadGateway(value.to_string())
            }
        }
    }
}
