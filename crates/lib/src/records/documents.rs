//! # Documents
//!
//! Metadata for files attached to a patient. Documents carry no owner column
//! of their own; they are reachable only through a patient owned by the caller.

use super::{commit, new_id, now_timestamp, patients, require, rollback};
use crate::errors::StoreError;
use serde::{Deserialize, Serialize};
use tracing::info;
use turso::{params, Connection, Database, Row, Value as TursoValue};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    #[serde(rename = "paciente_id")]
    pub patient_id: String,
    #[serde(rename = "nombre_original")]
    pub original_name: String,
    #[serde(rename = "tipo_mime")]
    pub mime_type: String,
    /// The generated on-disk file name.
    #[serde(skip)]
    pub stored_name: String,
    pub url: String,
    #[serde(rename = "fecha_subida")]
    pub uploaded_at: String,
}

/// Metadata of a file that has already been written by the upload store.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub patient_id: String,
    pub original_name: String,
    pub mime_type: String,
    pub stored_name: String,
    pub url: String,
}

const DOCUMENT_COLUMNS: &str =
    "d.id, d.patient_id, d.original_name, d.mime_type, d.stored_name, d.url, d.uploaded_at";

impl TryFrom<&Row> for Document {
    type Error = StoreError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Document {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            original_name: row.get(2)?,
            mime_type: row.get(3)?,
            stored_name: row.get(4)?,
            url: row.get(5)?,
            uploaded_at: row.get(6)?,
        })
    }
}

/// Records an uploaded file against one of the caller's patients.
///
/// The ownership check and the insert run in one transaction, so a patient
/// deleted concurrently never ends up with a document row.
pub async fn create_document(
    db: &Database,
    owner_id: &str,
    new: &NewDocument,
) -> Result<Document, StoreError> {
    require("paciente_id", &new.patient_id)?;
    require("archivo", &new.original_name)?;
    let conn = db.connect()?;

    conn.execute("BEGIN TRANSACTION", ()).await?;
    let document = match insert_document(&conn, owner_id, new).await {
        Ok(document) => document,
        Err(e) => return Err(rollback(&conn, e).await),
    };
    commit(&conn).await?;

    info!(
        owner_id = %owner_id,
        document_id = %document.id,
        patient_id = %document.patient_id,
        "Recorded document '{}'.",
        document.original_name
    );
    Ok(document)
}

async fn insert_document(
    conn: &Connection,
    owner_id: &str,
    new: &NewDocument,
) -> Result<Document, StoreError> {
    let patient = patients::find_owned(conn, owner_id, new.patient_id.trim()).await?;

    let document = Document {
        id: new_id(),
        patient_id: patient.id,
        original_name: new.original_name.clone(),
        mime_type: new.mime_type.clone(),
        stored_name: new.stored_name.clone(),
        url: new.url.clone(),
        uploaded_at: now_timestamp(),
    };

    conn.execute(
        "INSERT INTO documents (id, patient_id, original_name, mime_type, stored_name, url, uploaded_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            document.id.clone(),
            document.patient_id.clone(),
            document.original_name.clone(),
            document.mime_type.clone(),
            document.stored_name.clone(),
            document.url.clone(),
            document.uploaded_at.clone()
        ],
    )
    .await?;
    Ok(document)
}

/// Lists the caller's documents, optionally only those of one patient.
pub async fn list_documents(
    db: &Database,
    owner_id: &str,
    patient_id: Option<&str>,
) -> Result<Vec<Document>, StoreError> {
    let conn = db.connect()?;
    let (sql, params) = match patient_id {
        Some(patient_id) => (
            format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents d JOIN patients p ON p.id = d.patient_id
                 WHERE p.owner_id = ? AND d.patient_id = ? ORDER BY d.rowid ASC"
            ),
            vec![
                TursoValue::Text(owner_id.to_string()),
                TursoValue::Text(patient_id.to_string()),
            ],
        ),
        None => (
            format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents d JOIN patients p ON p.id = d.patient_id
                 WHERE p.owner_id = ? ORDER BY d.rowid ASC"
            ),
            vec![TursoValue::Text(owner_id.to_string())],
        ),
    };

    let mut rows = conn.query(&sql, params).await?;
    let mut documents = Vec::new();
    while let Some(row) = rows.next().await? {
        documents.push(Document::try_from(&row)?);
    }
    Ok(documents)
}

pub async fn get_document(
    db: &Database,
    owner_id: &str,
    document_id: &str,
) -> Result<Document, StoreError> {
    let conn = db.connect()?;
    find_owned(&conn, owner_id, document_id).await
}

/// Deletes a document row and returns it so the caller can remove the file.
pub async fn delete_document(
    db: &Database,
    owner_id: &str,
    document_id: &str,
) -> Result<Document, StoreError> {
    let conn = db.connect()?;
    let document = find_owned(&conn, owner_id, document_id).await?;
    conn.execute("DELETE FROM documents WHERE id = ?", params![document_id])
        .await?;
    info!(owner_id = %owner_id, document_id = %document_id, "Deleted document.");
    Ok(document)
}

pub(crate) async fn documents_of_patient(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<Document>, StoreError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents d WHERE d.patient_id = ? ORDER BY d.rowid ASC"
            ),
            params![patient_id],
        )
        .await?;
    let mut documents = Vec::new();
    while let Some(row) = rows.next().await? {
        documents.push(Document::try_from(&row)?);
    }
    Ok(documents)
}

async fn find_owned(
    conn: &Connection,
    owner_id: &str,
    document_id: &str,
) -> Result<Document, StoreError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents d JOIN patients p ON p.id = d.patient_id
                 WHERE d.id = ? AND p.owner_id = ?"
            ),
            params![document_id, owner_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Document::try_from(&row),
        None => Err(StoreError::NotFound("document")),
    }
}
