use crate::errors::StoreError;
use std::fmt::{self, Debug};
use tracing::{debug, info};
use turso::Database;

pub mod sql;

/// A provider for the local SQLite database, accessed through Turso.
///
/// Cloning the provider shares the same underlying database, which is how an
/// in-memory database is shared between the server state and tests.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteProvider {
    /// Opens (or creates) the database at `db_path`. Use ":memory:" for an
    /// isolated in-memory database.
    pub async fn new(db_path: &str) -> Result<Self, StoreError> {
        if db_path != ":memory:" {
            if let Some(parent) = std::path::Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::DataIntegrity(format!(
                            "Failed to create database directory '{}': {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }

        let db = turso::Builder::new_local(db_path).build().await?;

        // Use `query` for PRAGMA statements that return a value to avoid "unexpected row" errors.
        let conn = db.connect()?;
        conn.query("PRAGMA journal_mode=WAL;", ()).await?;

        info!(db_path = %db_path, "Opened SQLite database.");
        Ok(Self { db })
    }

    /// Ensures that all application tables and indexes exist.
    /// Idempotent and safe to call on every startup.
    pub async fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.db.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ()).await?;
        }
        debug!("Database schema is up to date.");
        Ok(())
    }

    /// Performs a trivial round-trip to confirm the database answers queries.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let conn = self.db.connect()?;
        let mut rows = conn.query("SELECT 1", ()).await?;
        rows.next()
            .await?
            .ok_or_else(|| StoreError::DataIntegrity("SELECT 1 returned no row".to_string()))?;
        Ok(())
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

impl AsRef<Database> for SqliteProvider {
    fn as_ref(&self) -> &Database {
        &self.db
    }
}
