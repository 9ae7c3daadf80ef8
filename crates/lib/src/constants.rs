//! # Shared Constants
//!
//! Centralized names and defaults shared by the crates of the `consulta`
//! workspace.

/// The default path for the main application SQLite database.
pub const DEFAULT_DB_FILE: &str = "db/consulta.db";

/// The default directory where uploaded patient documents are written.
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// The URL prefix under which stored uploads are served as static content.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// The format used for every timestamp persisted by this crate (UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
