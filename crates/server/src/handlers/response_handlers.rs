//! # Questionnaire Response Route Handlers

use super::{AppError, AppState};
use crate::{
    auth::middleware::AuthenticatedUser,
    types::{ApiJson, DeleteResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use consulta::records::responses::{
    create_response, delete_response, get_response, list_responses, NewQuestionnaireResponse,
    QuestionnaireResponse,
};

pub async fn create_response_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(payload): ApiJson<NewQuestionnaireResponse>,
) -> Result<(StatusCode, Json<QuestionnaireResponse>), AppError> {
    let response = create_response(&app_state.sqlite_provider.db, user.id(), &payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_responses_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<QuestionnaireResponse>>, AppError> {
    let responses = list_responses(&app_state.sqlite_provider.db, user.id()).await?;
    Ok(Json(responses))
}

pub async fn get_response_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(response_id): Path<String>,
) -> Result<Json<QuestionnaireResponse>, AppError> {
    let response = get_response(&app_state.sqlite_provider.db, user.id(), &response_id).await?;
    Ok(Json(response))
}

pub async fn delete_response_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(response_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    delete_response(&app_state.sqlite_provider.db, user.id(), &response_id).await?;
    Ok(Json(DeleteResponse::new("Response deleted successfully")))
}
