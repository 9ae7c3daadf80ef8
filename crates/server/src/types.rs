use crate::errors::AppError;
use axum::extract::FromRequest;
use serde::{Deserialize, Serialize};

/// A JSON body extractor whose rejections are rendered as `{"error": ...}` with 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// The public part of an account, as returned by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountSummary {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    #[serde(rename = "usuario")]
    pub user: AccountSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    #[serde(rename = "usuario")]
    pub user: AccountSummary,
}

/// Returned by every DELETE endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

impl DeleteResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct DocumentFilter {
    pub paciente_id: Option<String>,
}
