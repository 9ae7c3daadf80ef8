use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::MultipartError;
use consulta::StoreError;
use core_access::CoreAccessError;
use serde_json::json;
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Missing, empty or malformed input (400).
    Validation(String),
    /// Missing, invalid or expired bearer token, or a failed login (401).
    Unauthorized(String),
    /// The resource does not exist or belongs to someone else (404).
    NotFound(String),
    /// A unique key is already taken (409).
    Conflict(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => AppError::Validation(msg),
            StoreError::NotFound(_) => AppError::NotFound(err.to_string()),
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<CoreAccessError> for AppError {
    fn from(err: CoreAccessError) -> Self {
        match err {
            CoreAccessError::MissingCredentials => AppError::Validation(err.to_string()),
            CoreAccessError::DuplicateEmail(_) => AppError::Conflict(err.to_string()),
            CoreAccessError::InvalidCredentials | CoreAccessError::InvalidToken(_) => {
                AppError::Unauthorized("Invalid credentials".to_string())
            }
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<turso::Error> for AppError {
    fn from(err: turso::Error) -> Self {
        AppError::Internal(err.into())
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => {
                warn!("Rejected request: {msg}");
                (StatusCode::UNAUTHORIZED, msg)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
