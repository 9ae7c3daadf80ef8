//! # Questionnaire Responses
//!
//! A completed questionnaire is stored as a snapshot: the patient data, the
//! questions as they were presented and the answers are copied verbatim as
//! JSON, so later edits or deletions of the source questionnaire or patient
//! never change a stored response.

use super::{new_id, non_blank, now_timestamp, opt_text, require, text_or_null};
use crate::errors::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use turso::{params, Connection, Database, Row};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionnaireResponse {
    pub id: String,
    #[serde(rename = "user_id")]
    pub owner_id: String,
    #[serde(rename = "paciente")]
    pub patient_snapshot: Value,
    #[serde(rename = "cuestionario")]
    pub questionnaire_name: String,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "preguntas")]
    pub questions_snapshot: Value,
    #[serde(rename = "respuestas")]
    pub answers: Value,
    #[serde(rename = "fecha")]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewQuestionnaireResponse {
    #[serde(rename = "paciente", default)]
    pub patient_snapshot: Option<Value>,
    #[serde(rename = "cuestionario", default)]
    pub questionnaire_name: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "preguntas", default)]
    pub questions_snapshot: Option<Value>,
    #[serde(rename = "respuestas", default)]
    pub answers: Option<Value>,
}

fn require_json<'a>(field: &str, value: &'a Option<Value>) -> Result<&'a Value, StoreError> {
    match value {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(StoreError::validation(format!("Field '{field}' is required."))),
    }
}

impl NewQuestionnaireResponse {
    pub fn validate(&self) -> Result<(), StoreError> {
        require("cuestionario", &self.questionnaire_name)?;
        require_json("paciente", &self.patient_snapshot)?;
        require_json("preguntas", &self.questions_snapshot)?;
        require_json("respuestas", &self.answers)?;
        Ok(())
    }
}

const RESPONSE_COLUMNS: &str = "id, owner_id, patient_snapshot, questionnaire_name, description, \
     questions_snapshot, answers, created_at";

impl TryFrom<&Row> for QuestionnaireResponse {
    type Error = StoreError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let patient: String = row.get(2)?;
        let questions: String = row.get(5)?;
        let answers: String = row.get(6)?;
        Ok(QuestionnaireResponse {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            patient_snapshot: serde_json::from_str(&patient)?,
            questionnaire_name: row.get(3)?,
            description: opt_text(row, 4)?,
            questions_snapshot: serde_json::from_str(&questions)?,
            answers: serde_json::from_str(&answers)?,
            created_at: row.get(7)?,
        })
    }
}

pub async fn create_response(
    db: &Database,
    owner_id: &str,
    new: &NewQuestionnaireResponse,
) -> Result<QuestionnaireResponse, StoreError> {
    new.validate()?;
    let response = QuestionnaireResponse {
        id: new_id(),
        owner_id: owner_id.to_string(),
        patient_snapshot: require_json("paciente", &new.patient_snapshot)?.clone(),
        questionnaire_name: new.questionnaire_name.trim().to_string(),
        description: non_blank(new.description.as_deref()),
        questions_snapshot: require_json("preguntas", &new.questions_snapshot)?.clone(),
        answers: require_json("respuestas", &new.answers)?.clone(),
        created_at: now_timestamp(),
    };

    let conn = db.connect()?;
    conn.execute(
        "INSERT INTO questionnaire_responses
         (id, owner_id, patient_snapshot, questionnaire_name, description, questions_snapshot, answers, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            response.id.clone(),
            response.owner_id.clone(),
            serde_json::to_string(&response.patient_snapshot)?,
            response.questionnaire_name.clone(),
            text_or_null(&response.description),
            serde_json::to_string(&response.questions_snapshot)?,
            serde_json::to_string(&response.answers)?,
            response.created_at.clone()
        ],
    )
    .await?;

    info!(owner_id = %owner_id, response_id = %response.id, "Stored questionnaire response.");
    Ok(response)
}

pub async fn list_responses(
    db: &Database,
    owner_id: &str,
) -> Result<Vec<QuestionnaireResponse>, StoreError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {RESPONSE_COLUMNS} FROM questionnaire_responses WHERE owner_id = ? ORDER BY rowid ASC"
            ),
            params![owner_id],
        )
        .await?;
    let mut responses = Vec::new();
    while let Some(row) = rows.next().await? {
        responses.push(QuestionnaireResponse::try_from(&row)?);
    }
    Ok(responses)
}

pub async fn get_response(
    db: &Database,
    owner_id: &str,
    response_id: &str,
) -> Result<QuestionnaireResponse, StoreError> {
    let conn = db.connect()?;
    find_owned(&conn, owner_id, response_id).await
}

pub async fn delete_response(
    db: &Database,
    owner_id: &str,
    response_id: &str,
) -> Result<(), StoreError> {
    let conn = db.connect()?;
    find_owned(&conn, owner_id, response_id).await?;
    conn.execute(
        "DELETE FROM questionnaire_responses WHERE id = ? AND owner_id = ?",
        params![response_id, owner_id],
    )
    .await?;
    info!(owner_id = %owner_id, response_id = %response_id, "Deleted questionnaire response.");
    Ok(())
}

async fn find_owned(
    conn: &Connection,
    owner_id: &str,
    response_id: &str,
) -> Result<QuestionnaireResponse, StoreError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {RESPONSE_COLUMNS} FROM questionnaire_responses WHERE id = ? AND owner_id = ?"
            ),
            params![response_id, owner_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => QuestionnaireResponse::try_from(&row),
        None => Err(StoreError::NotFound("response")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{
        questionnaires::{create_questionnaire, delete_questionnaire, NewQuestion, NewQuestionnaire},
        test_support::setup,
    };
    use serde_json::json;

    #[tokio::test]
    async fn test_snapshot_survives_source_questionnaire_deletion() {
        let provider = setup().await;
        let db = &provider.db;

        let questionnaire = create_questionnaire(
            db,
            "owner-a",
            NewQuestionnaire {
                name: "PHQ-2".to_string(),
                description: None,
                kind: "depresion".to_string(),
                questions: vec![NewQuestion {
                    text: "Poco interés".to_string(),
                    options: vec!["Nunca".to_string(), "Casi siempre".to_string()],
                }],
            },
        )
        .await
        .unwrap();

        let snapshot = serde_json::to_value(&questionnaire.questions).unwrap();
        let stored = create_response(
            db,
            "owner-a",
            &NewQuestionnaireResponse {
                patient_snapshot: Some(json!({ "nombre": "Ana", "identificacion": "CC-1" })),
                questionnaire_name: questionnaire.name.clone(),
                description: Some("".to_string()),
                questions_snapshot: Some(snapshot.clone()),
                answers: Some(json!({ "0": "Casi siempre" })),
            },
        )
        .await
        .unwrap();
        assert_eq!(stored.description, None);

        delete_questionnaire(db, "owner-a", &questionnaire.id).await.unwrap();

        let fetched = get_response(db, "owner-a", &stored.id).await.unwrap();
        assert_eq!(fetched, stored);
        assert_eq!(fetched.questions_snapshot, snapshot);
        assert_eq!(fetched.patient_snapshot["nombre"], "Ana");
    }

    #[tokio::test]
    async fn test_null_answers_are_rejected() {
        let provider = setup().await;
        let err = create_response(
            &provider.db,
            "owner-a",
            &NewQuestionnaireResponse {
                patient_snapshot: Some(json!({ "nombre": "Ana" })),
                questionnaire_name: "PHQ-2".to_string(),
                description: None,
                questions_snapshot: Some(json!([])),
                answers: Some(Value::Null),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(msg) if msg.contains("respuestas")));
    }

    #[tokio::test]
    async fn test_responses_are_owner_scoped() {
        let provider = setup().await;
        let db = &provider.db;
        let stored = create_response(
            db,
            "owner-a",
            &NewQuestionnaireResponse {
                patient_snapshot: Some(json!({ "nombre": "Ana" })),
                questionnaire_name: "PHQ-2".to_string(),
                description: None,
                questions_snapshot: Some(json!([])),
                answers: Some(json!([])),
            },
        )
        .await
        .unwrap();

        assert!(list_responses(db, "owner-b").await.unwrap().is_empty());
        assert!(matches!(
            delete_response(db, "owner-b", &stored.id).await,
            Err(StoreError::NotFound("response"))
        ));
        delete_response(db, "owner-a", &stored.id).await.unwrap();
        assert!(list_responses(db, "owner-a").await.unwrap().is_empty());
    }
}
