//! # Questionnaires
//!
//! A questionnaire owns an ordered list of questions and each question owns an
//! ordered list of answer options. The three levels are written together by
//! [`create_questionnaire`] inside a single transaction: either the whole tree
//! is stored or nothing is.

use super::{
    commit, new_id, non_blank, now_timestamp, opt_text, require, rollback, text_or_null,
};
use crate::errors::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use turso::{params, Connection, Database, Row};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Questionnaire {
    pub id: String,
    #[serde(rename = "user_id")]
    pub owner_id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "tipo")]
    pub kind: String,
    pub created_at: String,
    #[serde(rename = "preguntas")]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: String,
    #[serde(rename = "texto")]
    pub text: String,
    #[serde(rename = "opciones")]
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionOption {
    pub id: String,
    #[serde(rename = "texto")]
    pub text: String,
}

/// Payload for creating a questionnaire with its questions and options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewQuestionnaire {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "tipo", default)]
    pub kind: String,
    #[serde(rename = "preguntas", default)]
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewQuestion {
    #[serde(rename = "texto", default)]
    pub text: String,
    #[serde(rename = "opciones", default)]
    pub options: Vec<String>,
}

impl NewQuestionnaire {
    pub fn validate(&self) -> Result<(), StoreError> {
        require("nombre", &self.name)?;
        require("tipo", &self.kind)?;
        for (i, question) in self.questions.iter().enumerate() {
            require(&format!("preguntas[{i}].texto"), &question.text)?;
            for (j, option) in question.options.iter().enumerate() {
                require(&format!("preguntas[{i}].opciones[{j}]"), option)?;
            }
        }
        Ok(())
    }

    /// Assigns ids and timestamps, producing the tree that will be stored.
    fn into_record(self, owner_id: &str) -> Questionnaire {
        Questionnaire {
            id: new_id(),
            owner_id: owner_id.to_string(),
            name: self.name.trim().to_string(),
            description: non_blank(self.description.as_deref()),
            kind: self.kind.trim().to_string(),
            created_at: now_timestamp(),
            questions: self
                .questions
                .into_iter()
                .map(|q| Question {
                    id: new_id(),
                    text: q.text.trim().to_string(),
                    options: q
                        .options
                        .into_iter()
                        .map(|o| QuestionOption {
                            id: new_id(),
                            text: o.trim().to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Stores a questionnaire, its questions and their options atomically.
///
/// Any failing insert rolls the whole write back and is reported as
/// [`StoreError::TransactionFailed`].
pub async fn create_questionnaire(
    db: &Database,
    owner_id: &str,
    new: NewQuestionnaire,
) -> Result<Questionnaire, StoreError> {
    new.validate()?;
    let questionnaire = new.into_record(owner_id);
    let conn = db.connect()?;

    conn.execute("BEGIN TRANSACTION", ()).await?;
    if let Err(e) = insert_questionnaire_tree(&conn, &questionnaire).await {
        return Err(rollback(&conn, e).await);
    }
    commit(&conn).await?;

    info!(
        owner_id = %owner_id,
        questionnaire_id = %questionnaire.id,
        "Stored questionnaire with {} questions and {} options.",
        questionnaire.questions.len(),
        questionnaire.questions.iter().map(|q| q.options.len()).sum::<usize>()
    );
    Ok(questionnaire)
}

async fn insert_questionnaire_tree(
    conn: &Connection,
    questionnaire: &Questionnaire,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO questionnaires (id, owner_id, name, description, kind, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            questionnaire.id.clone(),
            questionnaire.owner_id.clone(),
            questionnaire.name.clone(),
            text_or_null(&questionnaire.description),
            questionnaire.kind.clone(),
            questionnaire.created_at.clone()
        ],
    )
    .await?;

    for (q_pos, question) in questionnaire.questions.iter().enumerate() {
        conn.execute(
            "INSERT INTO questions (id, questionnaire_id, position, text) VALUES (?, ?, ?, ?)",
            params![
                question.id.clone(),
                questionnaire.id.clone(),
                q_pos as i64,
                question.text.clone()
            ],
        )
        .await?;

        for (o_pos, option) in question.options.iter().enumerate() {
            conn.execute(
                "INSERT INTO question_options (id, question_id, position, text) VALUES (?, ?, ?, ?)",
                params![
                    option.id.clone(),
                    question.id.clone(),
                    o_pos as i64,
                    option.text.clone()
                ],
            )
            .await?;
        }
    }
    Ok(())
}

const QUESTIONNAIRE_COLUMNS: &str = "id, owner_id, name, description, kind, created_at";

fn questionnaire_from_row(row: &Row) -> Result<Questionnaire, StoreError> {
    Ok(Questionnaire {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        description: opt_text(row, 3)?,
        kind: row.get(4)?,
        created_at: row.get(5)?,
        questions: Vec::new(),
    })
}

/// Loads the ordered questions and options of one questionnaire.
async fn load_questions(
    conn: &Connection,
    questionnaire_id: &str,
) -> Result<Vec<Question>, StoreError> {
    let mut rows = conn
        .query(
            "SELECT id, text FROM questions WHERE questionnaire_id = ? ORDER BY position ASC",
            params![questionnaire_id],
        )
        .await?;
    let mut questions = Vec::new();
    while let Some(row) = rows.next().await? {
        questions.push(Question {
            id: row.get(0)?,
            text: row.get(1)?,
            options: Vec::new(),
        });
    }
    if questions.is_empty() {
        return Ok(questions);
    }

    let mut rows = conn
        .query(
            "SELECT o.id, o.question_id, o.text
             FROM question_options o
             JOIN questions q ON q.id = o.question_id
             WHERE q.questionnaire_id = ?
             ORDER BY q.position ASC, o.position ASC",
            params![questionnaire_id],
        )
        .await?;
    let mut options_by_question: HashMap<String, Vec<QuestionOption>> = HashMap::new();
    while let Some(row) = rows.next().await? {
        let question_id: String = row.get(1)?;
        options_by_question
            .entry(question_id)
            .or_default()
            .push(QuestionOption {
                id: row.get(0)?,
                text: row.get(2)?,
            });
    }

    for question in &mut questions {
        question.options = options_by_question.remove(&question.id).unwrap_or_default();
    }
    Ok(questions)
}

/// Lists the caller's questionnaires, each with its full question tree.
pub async fn list_questionnaires(
    db: &Database,
    owner_id: &str,
) -> Result<Vec<Questionnaire>, StoreError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {QUESTIONNAIRE_COLUMNS} FROM questionnaires WHERE owner_id = ? ORDER BY rowid ASC"
            ),
            params![owner_id],
        )
        .await?;
    let mut questionnaires = Vec::new();
    while let Some(row) = rows.next().await? {
        questionnaires.push(questionnaire_from_row(&row)?);
    }

    for questionnaire in &mut questionnaires {
        questionnaire.questions = load_questions(&conn, &questionnaire.id).await?;
    }
    Ok(questionnaires)
}

pub async fn get_questionnaire(
    db: &Database,
    owner_id: &str,
    questionnaire_id: &str,
) -> Result<Questionnaire, StoreError> {
    let conn = db.connect()?;
    let mut questionnaire = find_owned(&conn, owner_id, questionnaire_id).await?;
    questionnaire.questions = load_questions(&conn, questionnaire_id).await?;
    Ok(questionnaire)
}

/// Deletes a questionnaire: options, then questions, then the questionnaire.
pub async fn delete_questionnaire(
    db: &Database,
    owner_id: &str,
    questionnaire_id: &str,
) -> Result<(), StoreError> {
    let conn = db.connect()?;

    conn.execute("BEGIN TRANSACTION", ()).await?;
    let questions_removed = match delete_questionnaire_tree(&conn, owner_id, questionnaire_id).await
    {
        Ok(n) => n,
        Err(e) => return Err(rollback(&conn, e).await),
    };
    commit(&conn).await?;

    info!(
        owner_id = %owner_id,
        questionnaire_id = %questionnaire_id,
        "Deleted questionnaire with {} questions.",
        questions_removed
    );
    Ok(())
}

async fn delete_questionnaire_tree(
    conn: &Connection,
    owner_id: &str,
    questionnaire_id: &str,
) -> Result<usize, StoreError> {
    find_owned(conn, owner_id, questionnaire_id).await?;

    let mut question_ids = Vec::new();
    let mut rows = conn
        .query(
            "SELECT id FROM questions WHERE questionnaire_id = ?",
            params![questionnaire_id],
        )
        .await?;
    while let Some(row) = rows.next().await? {
        question_ids.push(row.get::<String>(0)?);
    }

    for question_id in &question_ids {
        conn.execute(
            "DELETE FROM question_options WHERE question_id = ?",
            params![question_id.clone()],
        )
        .await?;
    }
    conn.execute(
        "DELETE FROM questions WHERE questionnaire_id = ?",
        params![questionnaire_id],
    )
    .await?;
    conn.execute(
        "DELETE FROM questionnaires WHERE id = ? AND owner_id = ?",
        params![questionnaire_id, owner_id],
    )
    .await?;
    Ok(question_ids.len())
}

async fn find_owned(
    conn: &Connection,
    owner_id: &str,
    questionnaire_id: &str,
) -> Result<Questionnaire, StoreError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {QUESTIONNAIRE_COLUMNS} FROM questionnaires WHERE id = ? AND owner_id = ?"
            ),
            params![questionnaire_id, owner_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => questionnaire_from_row(&row),
        None => Err(StoreError::NotFound("questionnaire")),
    }
}
