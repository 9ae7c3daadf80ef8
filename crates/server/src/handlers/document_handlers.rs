//! # Document Route Handlers
//!
//! File intake for patient documents. One file per request, sent as
//! `multipart/form-data` with an `archivo` file part and a `paciente_id` text
//! part.

use super::{AppError, AppState};
use crate::{
    auth::middleware::AuthenticatedUser,
    types::{DeleteResponse, DocumentFilter},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Multipart;
use consulta::records::{
    documents::{
        create_document, delete_document, get_document, list_documents, Document, NewDocument,
    },
    patients::ensure_patient_owned,
};
use tracing::{info, warn};

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

struct UploadedFile {
    original_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

/// `POST /api/documentos`
pub async fn upload_document_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut patient_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "archivo" => {
                let original_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|n| !n.trim().is_empty())
                    .ok_or_else(|| {
                        AppError::Validation("The 'archivo' part needs a file name.".to_string())
                    })?;
                let mime_type = field
                    .content_type()
                    .map(str::to_string)
                    .filter(|ct| !ct.is_empty() && ct != FALLBACK_MIME_TYPE)
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&original_name)
                            .first_or_octet_stream()
                            .essence_str()
                            .to_string()
                    });
                let bytes = field.bytes().await?.to_vec();
                file = Some(UploadedFile {
                    original_name,
                    mime_type,
                    bytes,
                });
            }
            "paciente_id" => {
                patient_id = Some(field.text().await?.trim().to_string());
            }
            _ => warn!("Ignoring unknown multipart field: {}", name),
        }
    }

    let file =
        file.ok_or_else(|| AppError::Validation("Field 'archivo' is required.".to_string()))?;
    let patient_id = patient_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Field 'paciente_id' is required.".to_string()))?;

    let db = &app_state.sqlite_provider.db;
    ensure_patient_owned(db, user.id(), &patient_id).await?;

    let stored = app_state
        .uploads
        .save(&file.original_name, &file.bytes)
        .await?;

    let new_document = NewDocument {
        patient_id,
        original_name: file.original_name,
        mime_type: file.mime_type,
        stored_name: stored.stored_name.clone(),
        url: stored.url,
    };
    let document = match create_document(db, user.id(), &new_document).await {
        Ok(document) => document,
        Err(e) => {
            if let Err(cleanup) = app_state.uploads.remove(&stored.stored_name).await {
                warn!("Failed to remove orphaned upload: {cleanup:#}");
            }
            return Err(e.into());
        }
    };

    info!(
        document_id = %document.id,
        size = file.bytes.len(),
        "Document uploaded."
    );
    Ok((StatusCode::CREATED, Json(document)))
}

/// `GET /api/documentos?paciente_id=`
pub async fn list_documents_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<DocumentFilter>,
) -> Result<Json<Vec<Document>>, AppError> {
    let patient_id = filter
        .paciente_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let documents = list_documents(&app_state.sqlite_provider.db, user.id(), patient_id).await?;
    Ok(Json(documents))
}

/// `GET /api/documentos/{id}`
pub async fn get_document_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(document_id): Path<String>,
) -> Result<Json<Document>, AppError> {
    let document = get_document(&app_state.sqlite_provider.db, user.id(), &document_id).await?;
    Ok(Json(document))
}

/// `DELETE /api/documentos/{id}`
pub async fn delete_document_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(document_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let document =
        delete_document(&app_state.sqlite_provider.db, user.id(), &document_id).await?;
    if let Err(e) = app_state.uploads.remove(&document.stored_name).await {
        warn!(document_id = %document.id, "Could not remove stored file: {e:#}");
    }
    Ok(Json(DeleteResponse::new("Document deleted successfully")))
}
