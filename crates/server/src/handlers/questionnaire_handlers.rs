//! # Questionnaire Route Handlers
//!
//! Questionnaires are written as a whole tree (questionnaire, questions,
//! options) in a single transaction and always read back nested.

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
use consulta::records::questionnaires::{
    create_questionnaire, delete_questionnaire, get_questionnaire, list_questionnaires,
    NewQuestionnaire, Questionnaire,
};

/// `POST /api/cuestionarios`
pub async fn create_questionnaire_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(payload): ApiJson<NewQuestionnaire>,
) -> Result<(StatusCode, Json<Questionnaire>), AppError> {
    let questionnaire =
        create_questionnaire(&app_state.sqlite_provider.db, user.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(questionnaire)))
}

/// `GET /api/cuestionarios`
pub async fn list_questionnaires_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Questionnaire>>, AppError> {
    let questionnaires = list_questionnaires(&app_state.sqlite_provider.db, user.id()).await?;
    Ok(Json(questionnaires))
}

/// `GET /api/cuestionarios/{id}`
pub async fn get_questionnaire_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(questionnaire_id): Path<String>,
) -> Result<Json<Questionnaire>, AppError> {
    let questionnaire =
        get_questionnaire(&app_state.sqlite_provider.db, user.id(), &questionnaire_id).await?;
    Ok(Json(questionnaire))
}

/// `DELETE /api/cuestionarios/{id}`
pub async fn delete_questionnaire_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(questionnaire_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    delete_questionnaire(&app_state.sqlite_provider.db, user.id(), &questionnaire_id).await?;
    Ok(Json(DeleteResponse::new("Questionnaire deleted successfully")))
}
