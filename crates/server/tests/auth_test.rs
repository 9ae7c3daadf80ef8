//! # Authentication Integration Tests
//!
//! Registration, login and the bearer-token gate, exercised over HTTP.

mod common;

use anyhow::Result;
use common::{TestApp, TEST_JWT_SECRET};
use core_access::{sign, Claims};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_public_routes_need_no_token() -> Result<()> {
    let app = TestApp::spawn().await?;

    let health = app.client.get(app.url("/health")).send().await?;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.text().await?, "OK");

    let db_check = app.client.get(app.url("/test-db")).send().await?;
    assert_eq!(db_check.status(), StatusCode::OK);
    let body: Value = db_check.json().await?;
    assert_eq!(body["success"], true);
    assert!(body["time"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_register_twice_conflicts() -> Result<()> {
    let app = TestApp::spawn().await?;
    let credentials = json!({ "email": "ana@example.com", "password": "pw-1" });

    let first = app
        .client
        .post(app.url("/api/usuarios"))
        .json(&credentials)
        .send()
        .await?;
    assert_eq!(first.status(), StatusCode::CREATED);
    let body: Value = first.json().await?;
    assert_eq!(body["usuario"]["email"], "ana@example.com");
    assert!(body["usuario"]["id"].is_string());
    assert!(body["usuario"].get("password_hash").is_none());

    let second = app
        .client
        .post(app.url("/api/usuarios"))
        .json(&json!({ "email": "ANA@example.com", "password": "pw-2" }))
        .send()
        .await?;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body: Value = second.json().await?;
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_register_requires_fields() -> Result<()> {
    let app = TestApp::spawn().await?;

    let missing = app
        .client
        .post(app.url("/api/usuarios"))
        .json(&json!({ "email": "ana@example.com" }))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let malformed = app
        .client
        .post(app.url("/api/usuarios"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    let body: Value = malformed.json().await?;
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_login_and_me() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register_and_login("luis@example.com").await?;
    assert!(!user.token.is_empty());

    let me = app.get("/api/me", &user.token).send().await?;
    assert_eq!(me.status(), StatusCode::OK);
    let body: Value = me.json().await?;
    assert_eq!(body["id"], user.id.as_str());
    assert_eq!(body["email"], "luis@example.com");

    let wrong_password = app
        .client
        .post(app.url("/api/login"))
        .json(&json!({ "email": "luis@example.com", "password": "nope" }))
        .send()
        .await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown = app
        .client
        .post(app.url("/api/login"))
        .json(&json!({ "email": "ghost@example.com", "password": "nope" }))
        .send()
        .await?;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_protected_routes_reject_bad_tokens() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register_and_login("eva@example.com").await?;

    let missing = app
        .client
        .get(app.url("/api/usuarios/psicologia"))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let tampered = format!("{}x", user.token);
    let response = app.get("/api/usuarios/psicologia", &tampered).send().await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let foreign_secret = sign(
        &Claims {
            id: user.id.clone(),
            email: user.email.clone(),
            exp: (chrono::Utc::now().timestamp() + 600) as usize,
        },
        "some-other-secret",
    )?;
    let response = app.get("/api/citas", &foreign_secret).send().await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let expired = sign(
        &Claims {
            id: user.id.clone(),
            email: user.email.clone(),
            exp: (chrono::Utc::now().timestamp() - 10) as usize,
        },
        TEST_JWT_SECRET,
    )?;
    let response = app.get("/api/citas", &expired).send().await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert!(body["error"].is_string());

    let valid = app.get("/api/citas", &user.token).send().await?;
    assert_eq!(valid.status(), StatusCode::OK);
    Ok(())
}
