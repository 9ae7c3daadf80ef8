//! # Custom Question Route Handlers

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
use consulta::records::custom_questions::{
    create_custom_question, delete_custom_question, list_custom_questions, CustomQuestion,
    NewCustomQuestion,
};

pub async fn create_custom_question_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(payload): ApiJson<NewCustomQuestion>,
) -> Result<(StatusCode, Json<CustomQuestion>), AppError> {
    let question =
        create_custom_question(&app_state.sqlite_provider.db, user.id(), &payload).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn list_custom_questions_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<CustomQuestion>>, AppError> {
    let questions = list_custom_questions(&app_state.sqlite_provider.db, user.id()).await?;
    Ok(Json(questions))
}

pub async fn delete_custom_question_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(question_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    delete_custom_question(&app_state.sqlite_provider.db, user.id(), &question_id).await?;
    Ok(Json(DeleteResponse::new("Question deleted successfully")))
}
