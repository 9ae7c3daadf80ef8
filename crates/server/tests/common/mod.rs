//! # Common Test Utilities
//!
//! This module centralizes the test harness and helper functions used across the
//! `consulta-server` integration tests.
//!
//! - `TestApp`: spawns the real router on a random port, backed by a temporary
//!   SQLite file and a temporary uploads directory.
//! - Helpers to register, log in and send authorized requests.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use consulta_server::{
    config::AppConfig,
    router,
    state::{build_app_state, AppState},
};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::{net::SocketAddr, path::PathBuf};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub app_state: AppState,
    pub uploads_dir: PathBuf,
    _data_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

/// A registered and logged-in account.
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

impl TestApp {
    /// Spawns the application server with default limits.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Spawns the application server after letting the caller adjust the config.
    pub async fn spawn_with(adjust: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let data_dir = tempdir()?;
        let db_path = data_dir.path().join("consulta.db");
        let uploads_dir = data_dir.path().join("uploads");

        let mut config = AppConfig {
            port: 0,
            db_url: db_path.to_string_lossy().to_string(),
            jwt_secret: TEST_JWT_SECRET.to_string(),
            token_ttl_secs: 3600,
            uploads_dir: uploads_dir.to_string_lossy().to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        };
        adjust(&mut config);

        let app_state = build_app_state(config).await?;
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            app_state: app_state_for_harness,
            uploads_dir,
            _data_dir: data_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn put(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    /// Registers `email` with a fixed password and logs in.
    pub async fn register_and_login(&self, email: &str) -> Result<TestUser> {
        let password = "correct horse battery staple";
        let credentials = json!({ "email": email, "password": password });

        let response = self
            .client
            .post(self.url("/api/usuarios"))
            .json(&credentials)
            .send()
            .await?;
        anyhow::ensure!(
            response.status() == reqwest::StatusCode::CREATED,
            "registration failed with {}",
            response.status()
        );

        let response = self
            .client
            .post(self.url("/api/login"))
            .json(&credentials)
            .send()
            .await?;
        anyhow::ensure!(response.status().is_success(), "login failed");
        let body: Value = response.json().await?;

        Ok(TestUser {
            id: body["usuario"]["id"].as_str().unwrap_or_default().to_string(),
            email: body["usuario"]["email"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            token: body["token"].as_str().unwrap_or_default().to_string(),
        })
    }

    /// Creates a patient over HTTP and returns its id.
    pub async fn create_patient(&self, user: &TestUser, name: &str) -> Result<String> {
        let response = self
            .post("/api/usuarios/psicologia", &user.token)
            .json(&json!({ "nombre": name, "identificacion": format!("ID-{name}") }))
            .send()
            .await?;
        anyhow::ensure!(
            response.status() == reqwest::StatusCode::CREATED,
            "patient creation failed with {}",
            response.status()
        );
        let body: Value = response.json().await?;
        Ok(body["id"].as_str().unwrap_or_default().to_string())
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
