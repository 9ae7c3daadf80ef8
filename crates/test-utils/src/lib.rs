use anyhow::Result;
use consulta::records::{
    appointments::{create_appointment, Appointment, NewAppointment},
    patients::{create_patient, NewPatient, NewPatientAnswer, PatientRecord},
};
use serde_json::{json, Value};
use turso::Database;

// --- Database ---

/// Counts the rows of `table` in any database.
pub async fn count_rows(db: &Database, table: &str) -> Result<i64> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(&format!("SELECT COUNT(*) FROM {table}"), ())
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| anyhow::anyhow!("COUNT(*) on '{table}' returned no row"))?;
    Ok(row.get(0)?)
}

// --- Fixtures ---

/// A patient payload with the required fields and one intake answer.
fn patient_payload(name: &str) -> NewPatient {
    NewPatient {
        name: name.to_string(),
        identification: format!("ID-{name}"),
        phone: Some("555-0100".to_string()),
        other_notes: None,
        answers: vec![NewPatientAnswer {
            question: "Motivo de consulta".to_string(),
            answer: Some("Ansiedad".to_string()),
        }],
    }
}

/// The JSON body of a questionnaire whose i-th question has `option_counts[i]` options.
pub fn questionnaire_json(name: &str, option_counts: &[usize]) -> Value {
    let questions: Vec<Value> = option_counts
        .iter()
        .enumerate()
        .map(|(q, &count)| {
            let options: Vec<String> = (0..count)
                .map(|o| format!("Q{} option {}", q + 1, o + 1))
                .collect();
            json!({ "texto": format!("Question {}", q + 1), "opciones": options })
        })
        .collect();
    json!({
        "nombre": name,
        "descripcion": format!("{name} description"),
        "tipo": "escala",
        "preguntas": questions,
    })
}

/// The JSON body of a completed-questionnaire snapshot.
pub fn response_json(patient_name: &str) -> Value {
    json!({
        "paciente": { "nombre": patient_name, "identificacion": "ID-1" },
        "cuestionario": "Escala de ansiedad",
        "preguntas": [{ "texto": "¿Duerme bien?", "opciones": ["Sí", "No"] }],
        "respuestas": { "0": "No" },
    })
}

/// Inserts a patient owned by `owner_id`.
pub async fn seed_patient(db: &Database, owner_id: &str, name: &str) -> Result<PatientRecord> {
    Ok(create_patient(db, owner_id, &patient_payload(name)).await?)
}

/// Inserts an appointment for one of `owner_id`'s patients.
pub async fn seed_appointment(
    db: &Database,
    owner_id: &str,
    patient_id: &str,
    date: &str,
    time: &str,
) -> Result<Appointment> {
    let new = NewAppointment {
        patient_id: patient_id.to_string(),
        date: date.to_string(),
        time: Some(time.to_string()),
        reason: "Seguimiento".to_string(),
    };
    Ok(create_appointment(db, owner_id, &new).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use consulta::providers::db::sqlite::SqliteProvider;

    #[tokio::test]
    async fn test_seeding_helpers_write_rows() {
        let provider = SqliteProvider::new(":memory:").await.unwrap();
        provider.initialize_schema().await.unwrap();
        let db = &provider.db;

        let patient = seed_patient(db, "owner-1", "Ana").await.unwrap();
        seed_appointment(db, "owner-1", &patient.patient.id, "2025-03-01", "09:30")
            .await
            .unwrap();

        assert_eq!(count_rows(db, "patients").await.unwrap(), 1);
        assert_eq!(count_rows(db, "patient_answers").await.unwrap(), 1);
        assert_eq!(count_rows(db, "appointments").await.unwrap(), 1);
    }

    #[test]
    fn test_questionnaire_json_shape() {
        let body = questionnaire_json("PHQ", &[2, 0]);
        assert_eq!(body["preguntas"].as_array().unwrap().len(), 2);
        assert_eq!(body["preguntas"][0]["opciones"][1], "Q1 option 2");
        assert!(body["preguntas"][1]["opciones"].as_array().unwrap().is_empty());
    }
}
