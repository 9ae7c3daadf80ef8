//! # Patients
//!
//! Patient registration, lookup and the cascading delete that also removes the
//! patient's intake answers, appointments and document rows.

use super::{
    commit, documents::Document, new_id, non_blank, now_timestamp, opt_text, require, rollback,
    text_or_null,
};
use crate::errors::StoreError;
use serde::{Deserialize, Serialize};
use tracing::info;
use turso::{params, Connection, Database, Row};

/// A patient row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: String,
    #[serde(rename = "user_id")]
    pub owner_id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "identificacion")]
    pub identification: String,
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    #[serde(rename = "otros_datos")]
    pub other_notes: Option<String>,
    pub created_at: String,
}

/// A question asked at intake together with the patient's answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientAnswer {
    pub id: String,
    #[serde(rename = "pregunta")]
    pub question: String,
    #[serde(rename = "respuesta")]
    pub answer: Option<String>,
}

/// A patient together with its intake answers, in submission order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    #[serde(flatten)]
    pub patient: Patient,
    #[serde(rename = "preguntas")]
    pub answers: Vec<PatientAnswer>,
}

/// Payload for registering a patient.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPatient {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "identificacion", default)]
    pub identification: String,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(rename = "otrosDatos", alias = "otros_datos", default)]
    pub other_notes: Option<String>,
    #[serde(rename = "preguntas", default)]
    pub answers: Vec<NewPatientAnswer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPatientAnswer {
    #[serde(rename = "pregunta", default)]
    pub question: String,
    #[serde(rename = "respuesta", default)]
    pub answer: Option<String>,
}

impl NewPatient {
    pub fn validate(&self) -> Result<(), StoreError> {
        require("nombre", &self.name)?;
        require("identificacion", &self.identification)?;
        for answer in &self.answers {
            require("preguntas[].pregunta", &answer.question)?;
        }
        Ok(())
    }
}

/// What a cascading patient delete removed.
#[derive(Debug, Clone, Default)]
pub struct PatientRemoval {
    pub appointments_removed: u64,
    /// The deleted document rows, so the caller can remove the stored files.
    pub documents: Vec<Document>,
}

const PATIENT_COLUMNS: &str =
    "id, owner_id, name, identification, phone, other_notes, created_at";

impl TryFrom<&Row> for Patient {
    type Error = StoreError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Patient {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            identification: row.get(3)?,
            phone: opt_text(row, 4)?,
            other_notes: opt_text(row, 5)?,
            created_at: row.get(6)?,
        })
    }
}

/// Registers a patient and its intake answers in one transaction.
pub async fn create_patient(
    db: &Database,
    owner_id: &str,
    new: &NewPatient,
) -> Result<PatientRecord, StoreError> {
    new.validate()?;
    let conn = db.connect()?;

    let patient = Patient {
        id: new_id(),
        owner_id: owner_id.to_string(),
        name: new.name.trim().to_string(),
        identification: new.identification.trim().to_string(),
        phone: non_blank(new.phone.as_deref()),
        other_notes: non_blank(new.other_notes.as_deref()),
        created_at: now_timestamp(),
    };
    let answers: Vec<PatientAnswer> = new
        .answers
        .iter()
        .map(|a| PatientAnswer {
            id: new_id(),
            question: a.question.trim().to_string(),
            answer: non_blank(a.answer.as_deref()),
        })
        .collect();

    conn.execute("BEGIN TRANSACTION", ()).await?;
    if let Err(e) = insert_patient_rows(&conn, &patient, &answers).await {
        return Err(rollback(&conn, e).await);
    }
    commit(&conn).await?;

    info!(
        owner_id = %owner_id,
        patient_id = %patient.id,
        "Registered patient with {} intake answers.",
        answers.len()
    );
    Ok(PatientRecord { patient, answers })
}

async fn insert_patient_rows(
    conn: &Connection,
    patient: &Patient,
    answers: &[PatientAnswer],
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO patients (id, owner_id, name, identification, phone, other_notes, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            patient.id.clone(),
            patient.owner_id.clone(),
            patient.name.clone(),
            patient.identification.clone(),
            text_or_null(&patient.phone),
            text_or_null(&patient.other_notes),
            patient.created_at.clone()
        ],
    )
    .await?;

    for (position, answer) in answers.iter().enumerate() {
        conn.execute(
            "INSERT INTO patient_answers (id, patient_id, position, question, answer)
             VALUES (?, ?, ?, ?, ?)",
            params![
                answer.id.clone(),
                patient.id.clone(),
                position as i64,
                answer.question.clone(),
                text_or_null(&answer.answer)
            ],
        )
        .await?;
    }
    Ok(())
}

/// Lists the caller's patients in registration order.
pub async fn list_patients(db: &Database, owner_id: &str) -> Result<Vec<Patient>, StoreError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {PATIENT_COLUMNS} FROM patients WHERE owner_id = ? ORDER BY rowid ASC"
            ),
            params![owner_id],
        )
        .await?;

    let mut patients = Vec::new();
    while let Some(row) = rows.next().await? {
        patients.push(Patient::try_from(&row)?);
    }
    Ok(patients)
}

/// Fetches one of the caller's patients with its intake answers.
pub async fn get_patient(
    db: &Database,
    owner_id: &str,
    patient_id: &str,
) -> Result<PatientRecord, StoreError> {
    let conn = db.connect()?;
    let patient = find_owned(&conn, owner_id, patient_id).await?;

    let mut rows = conn
        .query(
            "SELECT id, question, answer FROM patient_answers WHERE patient_id = ? ORDER BY position ASC",
            params![patient_id],
        )
        .await?;
    let mut answers = Vec::new();
    while let Some(row) = rows.next().await? {
        answers.push(PatientAnswer {
            id: row.get(0)?,
            question: row.get(1)?,
            answer: opt_text(&row, 2)?,
        });
    }

    Ok(PatientRecord { patient, answers })
}

/// Fails with `NotFound` unless the patient exists and belongs to `owner_id`.
pub async fn ensure_patient_owned(
    db: &Database,
    owner_id: &str,
    patient_id: &str,
) -> Result<(), StoreError> {
    let conn = db.connect()?;
    find_owned(&conn, owner_id, patient_id).await.map(|_| ())
}

pub(crate) async fn find_owned(
    conn: &Connection,
    owner_id: &str,
    patient_id: &str,
) -> Result<Patient, StoreError> {
    let mut rows = conn
        .query(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ? AND owner_id = ?"),
            params![patient_id, owner_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Patient::try_from(&row),
        None => Err(StoreError::NotFound("patient")),
    }
}

/// Deletes a patient and everything hanging off it.
///
/// The ownership check, the document listing and the deletes (intake answers,
/// appointments, documents, then the patient) share one transaction, so every
/// document row removed here is also returned to the caller.
pub async fn delete_patient(
    db: &Database,
    owner_id: &str,
    patient_id: &str,
) -> Result<PatientRemoval, StoreError> {
    let conn = db.connect()?;

    conn.execute("BEGIN TRANSACTION", ()).await?;
    let removal = match delete_patient_rows(&conn, owner_id, patient_id).await {
        Ok(removal) => removal,
        Err(e) => return Err(rollback(&conn, e).await),
    };
    commit(&conn).await?;

    info!(
        owner_id = %owner_id,
        patient_id = %patient_id,
        "Deleted patient, {} appointments and {} documents.",
        removal.appointments_removed,
        removal.documents.len()
    );
    Ok(removal)
}

async fn delete_patient_rows(
    conn: &Connection,
    owner_id: &str,
    patient_id: &str,
) -> Result<PatientRemoval, StoreError> {
    find_owned(conn, owner_id, patient_id).await?;
    let documents = super::documents::documents_of_patient(conn, patient_id).await?;

    conn.execute(
        "DELETE FROM patient_answers WHERE patient_id = ?",
        params![patient_id],
    )
    .await?;
    let appointments_removed = conn
        .execute(
            "DELETE FROM appointments WHERE patient_id = ? AND owner_id = ?",
            params![patient_id, owner_id],
        )
        .await?;
    conn.execute("DELETE FROM documents WHERE patient_id = ?", params![patient_id])
        .await?;
    let removed = conn
        .execute(
            "DELETE FROM patients WHERE id = ? AND owner_id = ?",
            params![patient_id, owner_id],
        )
        .await?;
    if removed == 0 {
        return Err(StoreError::NotFound("patient"));
    }
    Ok(PatientRemoval {
        appointments_removed,
        documents,
    })
}
