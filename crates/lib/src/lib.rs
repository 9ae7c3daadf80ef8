//! # Consulta
//!
//! Domain layer of the clinical-record backend: the record types exchanged over
//! the API, their validation rules, and the owner-scoped persistence functions
//! built on a local SQLite database accessed through Turso.
//!
//! Every public persistence function takes the caller's `owner_id` and only
//! ever touches rows that belong to it. Rows owned by somebody else are
//! reported as [`StoreError::NotFound`], exactly like rows that do not exist.

pub mod constants;
pub mod errors;
pub mod providers;
pub mod records;

pub use errors::StoreError;
pub use providers::db::sqlite::SqliteProvider;
