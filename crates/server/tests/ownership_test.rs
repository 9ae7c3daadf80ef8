//! # Ownership Integration Test
//!
//! Every resource is visible only to the account that created it. Another
//! account gets `404`, exactly as if the row did not exist.

mod common;

use anyhow::Result;
use common::{TestApp, TestUser};
use consulta_test_utils::{questionnaire_json, response_json, seed_appointment, seed_patient};
use reqwest::StatusCode;
use serde_json::{json, Value};

struct Seeded {
    patient: String,
    appointment: String,
    question: String,
    questionnaire: String,
    response: String,
}

async fn created_id(response: reqwest::Response) -> Result<String> {
    anyhow::ensure!(
        response.status() == StatusCode::CREATED,
        "expected 201, got {}",
        response.status()
    );
    let body: Value = response.json().await?;
    Ok(body["id"].as_str().unwrap_or_default().to_string())
}

async fn seed(app: &TestApp, owner: &TestUser) -> Result<Seeded> {
    let patient = app.create_patient(owner, "Marta").await?;
    let appointment = created_id(
        app.post("/api/citas", &owner.token)
            .json(&json!({
                "paciente_id": patient,
                "fecha": "2025-05-02",
                "hora": "10:00",
                "motivo": "Primera sesión"
            }))
            .send()
            .await?,
    )
    .await?;
    let question = created_id(
        app.post("/api/preguntas", &owner.token)
            .json(&json!({ "pregunta": "¿Toma medicación?" }))
            .send()
            .await?,
    )
    .await?;
    let questionnaire = created_id(
        app.post("/api/cuestionarios", &owner.token)
            .json(&questionnaire_json("GAD-7", &[2]))
            .send()
            .await?,
    )
    .await?;
    let response = created_id(
        app.post("/api/cuestionarios-resueltos", &owner.token)
            .json(&response_json("Marta"))
            .send()
            .await?,
    )
    .await?;

    Ok(Seeded {
        patient,
        appointment,
        question,
        questionnaire,
        response,
    })
}

#[tokio::test]
async fn test_other_user_sees_nothing() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.register_and_login("owner@example.com").await?;
    let intruder = app.register_and_login("intruder@example.com").await?;
    let seeded = seed(&app, &owner).await?;

    for path in [
        "/api/usuarios/psicologia",
        "/api/citas",
        "/api/preguntas",
        "/api/cuestionarios",
        "/api/cuestionarios-resueltos",
        "/api/documentos",
    ] {
        let owner_list: Vec<Value> = app.get(path, &owner.token).send().await?.json().await?;
        let intruder_list: Vec<Value> =
            app.get(path, &intruder.token).send().await?.json().await?;
        assert!(intruder_list.is_empty(), "{path} leaked rows to another user");
        if path != "/api/documentos" {
            assert_eq!(owner_list.len(), 1, "{path} should list the owner's row");
        }
    }

    let readable = [
        format!("/api/usuarios/psicologia/{}", seeded.patient),
        format!("/api/citas/{}", seeded.appointment),
        format!("/api/cuestionarios/{}", seeded.questionnaire),
        format!("/api/cuestionarios-resueltos/{}", seeded.response),
    ];
    for path in &readable {
        let as_owner = app.get(path, &owner.token).send().await?;
        assert_eq!(as_owner.status(), StatusCode::OK, "{path}");
        let as_intruder = app.get(path, &intruder.token).send().await?;
        assert_eq!(as_intruder.status(), StatusCode::NOT_FOUND, "{path}");
    }

    let mut deletable = readable.to_vec();
    deletable.push(format!("/api/preguntas/{}", seeded.question));
    for path in &deletable {
        let response = app.delete(path, &intruder.token).send().await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        let body: Value = response.json().await?;
        assert!(body["error"].is_string());
    }

    // Nothing was removed by the failed attempts.
    for path in &readable {
        let as_owner = app.get(path, &owner.token).send().await?;
        assert_eq!(as_owner.status(), StatusCode::OK, "{path}");
    }
    Ok(())
}

#[tokio::test]
async fn test_cannot_attach_to_foreign_patient() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.register_and_login("owner@example.com").await?;
    let intruder = app.register_and_login("intruder@example.com").await?;
    let patient = app.create_patient(&owner, "Marta").await?;

    let appointment = app
        .post("/api/citas", &intruder.token)
        .json(&json!({
            "paciente_id": patient,
            "fecha": "2025-05-02",
            "hora": "10:00",
            "motivo": "Intento"
        }))
        .send()
        .await?;
    assert_eq!(appointment.status(), StatusCode::NOT_FOUND);

    let form = reqwest::multipart::Form::new()
        .text("paciente_id", patient.clone())
        .part(
            "archivo",
            reqwest::multipart::Part::bytes(b"secret".to_vec())
                .file_name("notes.txt")
                .mime_str("text/plain")?,
        );
    let upload = app
        .post("/api/documentos", &intruder.token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(upload.status(), StatusCode::NOT_FOUND);

    // The rejected upload left no file behind.
    let mut entries = tokio::fs::read_dir(&app.uploads_dir).await?;
    assert!(entries.next_entry().await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_rows_stored_for_one_account_stay_private() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.register_and_login("owner@example.com").await?;
    let intruder = app.register_and_login("intruder@example.com").await?;
    let db = &app.app_state.sqlite_provider.db;

    let record = seed_patient(db, &owner.id, "Lucía").await?;
    let appointment =
        seed_appointment(db, &owner.id, &record.patient.id, "2025-06-10", "16:00").await?;

    let paths = [
        format!("/api/usuarios/psicologia/{}", record.patient.id),
        format!("/api/citas/{}", appointment.id),
    ];
    for path in &paths {
        let as_owner = app.get(path, &owner.token).send().await?;
        assert_eq!(as_owner.status(), StatusCode::OK, "{path}");
        let as_intruder = app.get(path, &intruder.token).send().await?;
        assert_eq!(as_intruder.status(), StatusCode::NOT_FOUND, "{path}");
    }

    let intruder_appointments: Vec<Value> =
        app.get("/api/citas", &intruder.token).send().await?.json().await?;
    assert!(intruder_appointments.is_empty());
    Ok(())
}
