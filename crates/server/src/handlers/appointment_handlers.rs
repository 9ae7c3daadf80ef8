//! # Appointment Route Handlers

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
use consulta::records::appointments::{
    create_appointment, delete_appointment, get_appointment, list_appointments,
    update_appointment, Appointment, NewAppointment,
};

/// `POST /api/citas`
pub async fn create_appointment_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(payload): ApiJson<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment =
        create_appointment(&app_state.sqlite_provider.db, user.id(), &payload).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// `GET /api/citas`, ordered by date then time.
pub async fn list_appointments_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = list_appointments(&app_state.sqlite_provider.db, user.id()).await?;
    Ok(Json(appointments))
}

/// `GET /api/citas/{id}`
pub async fn get_appointment_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(appointment_id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let appointment =
        get_appointment(&app_state.sqlite_provider.db, user.id(), &appointment_id).await?;
    Ok(Json(appointment))
}

/// `PUT /api/citas/{id}`
pub async fn update_appointment_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(appointment_id): Path<String>,
    ApiJson(payload): ApiJson<NewAppointment>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = update_appointment(
        &app_state.sqlite_provider.db,
        user.id(),
        &appointment_id,
        &payload,
    )
    .await?;
    Ok(Json(appointment))
}

/// `DELETE /api/citas/{id}`
pub async fn delete_appointment_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(appointment_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    delete_appointment(&app_state.sqlite_provider.db, user.id(), &appointment_id).await?;
    Ok(Json(DeleteResponse::new("Appointment deleted successfully")))
}
