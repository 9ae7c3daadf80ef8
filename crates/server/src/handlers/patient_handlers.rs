//! # Patient Route Handlers

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
use consulta::records::patients::{
    create_patient, delete_patient, get_patient, list_patients, NewPatient, Patient,
    PatientRecord,
};
use tracing::{info, warn};

/// `POST /api/usuarios/psicologia`
pub async fn create_patient_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(payload): ApiJson<NewPatient>,
) -> Result<(StatusCode, Json<PatientRecord>), AppError> {
    let record = create_patient(&app_state.sqlite_provider.db, user.id(), &payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/usuarios/psicologia`
pub async fn list_patients_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Patient>>, AppError> {
    let patients = list_patients(&app_state.sqlite_provider.db, user.id()).await?;
    Ok(Json(patients))
}

/// `GET /api/usuarios/psicologia/{id}`
pub async fn get_patient_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientRecord>, AppError> {
    let record = get_patient(&app_state.sqlite_provider.db, user.id(), &patient_id).await?;
    Ok(Json(record))
}

/// `DELETE /api/usuarios/psicologia/{id}`
///
/// Removes the patient together with its answers, appointments and documents,
/// then deletes the stored document files.
pub async fn delete_patient_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(patient_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let removal = delete_patient(&app_state.sqlite_provider.db, user.id(), &patient_id).await?;

    // The rows are already gone; a leftover file is only worth a warning.
    for document in &removal.documents {
        if let Err(e) = app_state.uploads.remove(&document.stored_name).await {
            warn!(document_id = %document.id, "Could not remove stored file: {e:#}");
        }
    }
    info!(
        patient_id = %patient_id,
        appointments = removal.appointments_removed,
        documents = removal.documents.len(),
        "Patient removed with dependents."
    );

    Ok(Json(DeleteResponse::new("Patient deleted successfully")))
}
