//! # Custom Questions
//!
//! A per-user bank of reusable question texts.

use super::{new_id, now_timestamp, require};
use crate::errors::StoreError;
use serde::{Deserialize, Serialize};
use tracing::info;
use turso::{params, Database};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomQuestion {
    pub id: String,
    #[serde(rename = "user_id")]
    pub owner_id: String,
    #[serde(rename = "pregunta")]
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCustomQuestion {
    #[serde(rename = "pregunta", default)]
    pub text: String,
}

pub async fn create_custom_question(
    db: &Database,
    owner_id: &str,
    new: &NewCustomQuestion,
) -> Result<CustomQuestion, StoreError> {
    require("pregunta", &new.text)?;
    let question = CustomQuestion {
        id: new_id(),
        owner_id: owner_id.to_string(),
        text: new.text.trim().to_string(),
        created_at: now_timestamp(),
    };

    let conn = db.connect()?;
    conn.execute(
        "INSERT INTO custom_questions (id, owner_id, text, created_at) VALUES (?, ?, ?, ?)",
        params![
            question.id.clone(),
            question.owner_id.clone(),
            question.text.clone(),
            question.created_at.clone()
        ],
    )
    .await?;
    info!(owner_id = %owner_id, question_id = %question.id, "Saved custom question.");
    Ok(question)
}

pub async fn list_custom_questions(
    db: &Database,
    owner_id: &str,
) -> Result<Vec<CustomQuestion>, StoreError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT id, owner_id, text, created_at FROM custom_questions
             WHERE owner_id = ? ORDER BY rowid ASC",
            params![owner_id],
        )
        .await?;

    let mut questions = Vec::new();
    while let Some(row) = rows.next().await? {
        questions.push(CustomQuestion {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            text: row.get(2)?,
            created_at: row.get(3)?,
        });
    }
    Ok(questions)
}

pub async fn delete_custom_question(
    db: &Database,
    owner_id: &str,
    question_id: &str,
) -> Result<(), StoreError> {
    let conn = db.connect()?;
    let removed = conn
        .execute(
            "DELETE FROM custom_questions WHERE id = ? AND owner_id = ?",
            params![question_id, owner_id],
        )
        .await?;
    if removed == 0 {
        return Err(StoreError::NotFound("question"));
    }
    info!(owner_id = %owner_id, question_id = %question_id, "Deleted custom question.");
    Ok(())
}
