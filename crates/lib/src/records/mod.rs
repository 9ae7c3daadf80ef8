//! # Records
//!
//! Owner-scoped persistence for every resource of the application. Each
//! sub-module owns one table family: its API types (serialized with the wire
//! names used by the browser client), its validation rules and its queries.

pub mod appointments;
pub mod custom_questions;
pub mod documents;
pub mod patients;
pub mod questionnaires;
pub mod responses;

use crate::{constants::TIMESTAMP_FORMAT, errors::StoreError};
use chrono::Utc;
use tracing::{error, warn};
use turso::{Connection, Row, Value as TursoValue};
use uuid::Uuid;

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Rejects a required text field that is empty or only whitespace.
pub(crate) fn require(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!(
            "Field '{field}' is required."
        )));
    }
    Ok(())
}

/// Normalizes an optional text field: blank values are stored as NULL.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Binds an optional text value, mapping `None` to SQL NULL.
pub(crate) fn text_or_null(value: &Option<String>) -> TursoValue {
    match value {
        Some(text) => TursoValue::Text(text.clone()),
        None => TursoValue::Null,
    }
}

/// Reads a nullable TEXT column.
pub(crate) fn opt_text(row: &Row, idx: usize) -> Result<Option<String>, StoreError> {
    match row.get_value(idx)? {
        TursoValue::Null => Ok(None),
        TursoValue::Text(s) => Ok(Some(s)),
        other => Err(StoreError::DataIntegrity(format!(
            "Expected TEXT or NULL in column {idx}, found {other:?}"
        ))),
    }
}

/// Rolls back the open transaction on `conn` and wraps the failure cause.
///
/// Lookup failures (`NotFound`, `Validation`) are returned unchanged so callers
/// still see them as client errors.
pub(crate) async fn rollback(conn: &Connection, cause: StoreError) -> StoreError {
    if let Err(e) = conn.execute("ROLLBACK", ()).await {
        error!("ROLLBACK failed: {e}");
    }
    match cause {
        StoreError::NotFound(_) | StoreError::Validation(_) => cause,
        other => {
            warn!("Statement failed inside transaction, rolled back: {other}");
            StoreError::TransactionFailed(other.to_string())
        }
    }
}

/// Commits the open transaction on `conn`, rolling back if the commit fails.
pub(crate) async fn commit(conn: &Connection) -> Result<(), StoreError> {
    match conn.execute("COMMIT", ()).await {
        Ok(_) => Ok(()),
        Err(e) => Err(rollback(conn, e.into()).await),
    }
}
