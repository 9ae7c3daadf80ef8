//! # Appointments
//!
//! Appointments reference one of the caller's patients. The patient's name is
//! copied onto the row when it is written.

use super::{new_id, now_timestamp, patients, require};
use crate::errors::StoreError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use turso::{params, Database, Row};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    #[serde(rename = "user_id")]
    pub owner_id: String,
    #[serde(rename = "paciente_id")]
    pub patient_id: String,
    #[serde(rename = "nombre_paciente")]
    pub patient_name: String,
    /// `YYYY-MM-DD`
    #[serde(rename = "fecha")]
    pub date: String,
    /// `HH:MM`
    #[serde(rename = "hora")]
    pub time: String,
    #[serde(rename = "motivo")]
    pub reason: String,
    pub created_at: String,
}

/// Payload for creating or replacing an appointment.
///
/// `fecha` is either a calendar date (`YYYY-MM-DD`, with `hora` as `HH:MM`)
/// or a full RFC 3339 timestamp, in which case `hora` may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAppointment {
    #[serde(rename = "paciente_id", default)]
    pub patient_id: String,
    #[serde(rename = "fecha", default)]
    pub date: String,
    #[serde(rename = "hora", default)]
    pub time: Option<String>,
    #[serde(rename = "motivo", default)]
    pub reason: String,
}

impl NewAppointment {
    pub fn validate(&self) -> Result<(), StoreError> {
        require("paciente_id", &self.patient_id)?;
        require("fecha", &self.date)?;
        require("motivo", &self.reason)?;
        self.schedule().map(|_| ())
    }

    /// Resolves the requested date and time.
    pub fn schedule(&self) -> Result<(NaiveDate, NaiveTime), StoreError> {
        let date_str = self.date.trim();
        let time_str = self.time.as_deref().map(str::trim).filter(|t| !t.is_empty());

        if let Some(time_str) = time_str {
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
                .or_else(|_| {
                    DateTime::parse_from_rfc3339(date_str)
                        .map(|dt| dt.with_timezone(&Utc).date_naive())
                })
                .map_err(|_| {
                    StoreError::validation(format!(
                        "Field 'fecha' is not a valid date: '{date_str}'."
                    ))
                })?;
            let time = NaiveTime::parse_from_str(time_str, TIME_FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(time_str, "%H:%M:%S"))
                .map_err(|_| {
                    StoreError::validation(format!(
                        "Field 'hora' is not a valid time: '{time_str}'."
                    ))
                })?;
            return Ok((date, time));
        }

        let instant = DateTime::parse_from_rfc3339(date_str).map_err(|_| {
            StoreError::validation(
                "Field 'hora' is required unless 'fecha' is a full RFC 3339 timestamp.",
            )
        })?;
        let utc = instant.with_timezone(&Utc);
        Ok((utc.date_naive(), utc.time()))
    }
}

const APPOINTMENT_COLUMNS: &str =
    "id, owner_id, patient_id, patient_name, date, time, reason, created_at";

impl TryFrom<&Row> for Appointment {
    type Error = StoreError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            patient_id: row.get(2)?,
            patient_name: row.get(3)?,
            date: row.get(4)?,
            time: row.get(5)?,
            reason: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

/// Books an appointment for one of the caller's patients.
pub async fn create_appointment(
    db: &Database,
    owner_id: &str,
    new: &NewAppointment,
) -> Result<Appointment, StoreError> {
    new.validate()?;
    let (date, time) = new.schedule()?;
    let conn = db.connect()?;
    let patient = patients::find_owned(&conn, owner_id, new.patient_id.trim()).await?;

    let appointment = Appointment {
        id: new_id(),
        owner_id: owner_id.to_string(),
        patient_id: patient.id,
        patient_name: patient.name,
        date: date.format(DATE_FORMAT).to_string(),
        time: time.format(TIME_FORMAT).to_string(),
        reason: new.reason.trim().to_string(),
        created_at: now_timestamp(),
    };

    conn.execute(
        "INSERT INTO appointments (id, owner_id, patient_id, patient_name, date, time, reason, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            appointment.id.clone(),
            appointment.owner_id.clone(),
            appointment.patient_id.clone(),
            appointment.patient_name.clone(),
            appointment.date.clone(),
            appointment.time.clone(),
            appointment.reason.clone(),
            appointment.created_at.clone()
        ],
    )
    .await?;

    info!(owner_id = %owner_id, appointment_id = %appointment.id, "Booked appointment.");
    Ok(appointment)
}

/// Replaces the patient, schedule and reason of an existing appointment.
pub async fn update_appointment(
    db: &Database,
    owner_id: &str,
    appointment_id: &str,
    new: &NewAppointment,
) -> Result<Appointment, StoreError> {
    new.validate()?;
    let (date, time) = new.schedule()?;
    let conn = db.connect()?;

    let current = find_owned(&conn, owner_id, appointment_id).await?;
    let patient = patients::find_owned(&conn, owner_id, new.patient_id.trim()).await?;

    let updated = Appointment {
        patient_id: patient.id,
        patient_name: patient.name,
        date: date.format(DATE_FORMAT).to_string(),
        time: time.format(TIME_FORMAT).to_string(),
        reason: new.reason.trim().to_string(),
        ..current
    };

    conn.execute(
        "UPDATE appointments SET patient_id = ?, patient_name = ?, date = ?, time = ?, reason = ?
         WHERE id = ? AND owner_id = ?",
        params![
            updated.patient_id.clone(),
            updated.patient_name.clone(),
            updated.date.clone(),
            updated.time.clone(),
            updated.reason.clone(),
            appointment_id,
            owner_id
        ],
    )
    .await?;

    info!(owner_id = %owner_id, appointment_id = %appointment_id, "Rescheduled appointment.");
    Ok(updated)
}

/// Lists the caller's appointments, earliest first.
pub async fn list_appointments(
    db: &Database,
    owner_id: &str,
) -> Result<Vec<Appointment>, StoreError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE owner_id = ?
                 ORDER BY date ASC, time ASC, rowid ASC"
            ),
            params![owner_id],
        )
        .await?;

    let mut appointments = Vec::new();
    while let Some(row) = rows.next().await? {
        appointments.push(Appointment::try_from(&row)?);
    }
    Ok(appointments)
}

pub async fn get_appointment(
    db: &Database,
    owner_id: &str,
    appointment_id: &str,
) -> Result<Appointment, StoreError> {
    let conn = db.connect()?;
    find_owned(&conn, owner_id, appointment_id).await
}

pub async fn delete_appointment(
    db: &Database,
    owner_id: &str,
    appointment_id: &str,
) -> Result<(), StoreError> {
    let conn = db.connect()?;
    find_owned(&conn, owner_id, appointment_id).await?;
    conn.execute(
        "DELETE FROM appointments WHERE id = ? AND owner_id = ?",
        params![appointment_id, owner_id],
    )
    .await?;
    info!(owner_id = %owner_id, appointment_id = %appointment_id, "Deleted appointment.");
    Ok(())
}

async fn find_owned(
    conn: &turso::Connection,
    owner_id: &str,
    appointment_id: &str,
) -> Result<Appointment, StoreError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ? AND owner_id = ?"
            ),
            params![appointment_id, owner_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Appointment::try_from(&row),
        None => Err(StoreError::NotFound("appointment")),
    }
}
