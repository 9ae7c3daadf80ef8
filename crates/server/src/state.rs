//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds all shared resources (the
//! configuration, the database provider and the upload store), making them
//! accessible to all request handlers.

use crate::{
    config::AppConfig,
    uploads::{LocalUploadStore, UploadStore},
};
use consulta::SqliteProvider;
use std::sync::Arc;
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's resolved configuration.
    pub config: Arc<AppConfig>,
    /// The database provider for all clinical records.
    pub sqlite_provider: Arc<SqliteProvider>,
    /// Where uploaded document files are written.
    pub uploads: Arc<dyn UploadStore>,
}

/// Builds the shared application state from the configuration.
///
/// Opens the database, makes sure the schema exists and prepares the upload
/// directory.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let sqlite_provider = SqliteProvider::new(&config.db_url).await?;
    info!(db_path = %config.db_url, "Initialized local storage provider (SQLite).");
    sqlite_provider.initialize_schema().await?;

    let uploads = LocalUploadStore::new(&config.uploads_dir).await?;
    info!(uploads_dir = %config.uploads_dir, "Initialized upload store.");

    Ok(AppState {
        config: Arc::new(config),
        sqlite_provider: Arc::new(sqlite_provider),
        uploads: Arc::new(uploads),
    })
}
