//! # Authentication Route Handlers
//!
//! Registration, login and the current-principal endpoint.

use super::{AppError, AppState};
use crate::{
    auth::middleware::AuthenticatedUser,
    types::{AccountSummary, ApiJson, CredentialsRequest, LoginResponse, RegisterResponse},
};
use axum::{extract::State, http::StatusCode, Json};
use core_access::{authenticate, issue_token, register_user};
use tracing::info;

/// `POST /api/usuarios`
pub async fn register_handler(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user = register_user(
        &app_state.sqlite_provider.db,
        &payload.email,
        &payload.password,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: AccountSummary {
                id: user.id,
                email: user.email,
            },
        }),
    ))
}

/// `POST /api/login`
pub async fn login_handler(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = authenticate(
        &app_state.sqlite_provider.db,
        &payload.email,
        &payload.password,
    )
    .await?;

    let token = issue_token(
        &user,
        &app_state.config.jwt_secret,
        app_state.config.token_ttl_secs,
    )?;
    info!(user_id = %user.id, "User logged in.");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: AccountSummary {
            id: user.id,
            email: user.email,
        },
    }))
}

/// Returns the details of the currently authenticated user.
pub async fn get_me_handler(user: AuthenticatedUser) -> Json<AccountSummary> {
    Json(AccountSummary {
        id: user.id().to_string(),
        email: user.email().to_string(),
    })
}
