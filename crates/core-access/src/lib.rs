//! # Core Access Crate
//!
//! This crate is the central authority for identity and authentication in
//! `consulta`: account registration, credential checks and bearer tokens.
//! Authorization (record ownership) is enforced by the store itself.

pub mod password;
pub mod token;

pub use token::{Claims, DEFAULT_TOKEN_TTL_SECS, issue_token, sign, verify_token};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use turso::{Database, Error as TursoError, Row, params};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum CoreAccessError {
    #[error("Database error: {0}")]
    Database(#[from] TursoError),
    #[error("Email and password are required")]
    MissingCredentials,
    #[error("The email '{0}' is already registered")]
    DuplicateEmail(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),
    #[error("Failed to sign token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
}

/// Represents a registered professional.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: String,
    /// Always stored trimmed and lowercased.
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Row> for User {
    type Error = CoreAccessError;

    fn try_from(row: &Row) -> std::result::Result<Self, Self::Error> {
        let created_at_str: String = row.get(2)?;
        let created_at = chrono::NaiveDateTime::parse_from_str(&created_at_str, TIMESTAMP_FORMAT)
            .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
            .map_err(|e| {
                CoreAccessError::DataIntegrity(format!(
                    "Failed to parse date '{created_at_str}': {e}"
                ))
            })?;

        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            created_at,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_unique_violation(err: &TursoError) -> bool {
    err.to_string().to_uppercase().contains("UNIQUE")
}

/// Creates a new account.
///
/// The email is normalized before the uniqueness check, so `Ana@Example.com`
/// and `ana@example.com` are the same account.
pub async fn register_user(
    db: &Database,
    email: &str,
    password: &str,
) -> Result<User, CoreAccessError> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(CoreAccessError::MissingCredentials);
    }

    let conn = db.connect()?;
    let exists = conn
        .query("SELECT 1 FROM users WHERE email = ?", params![email.clone()])
        .await?
        .next()
        .await?
        .is_some();
    if exists {
        return Err(CoreAccessError::DuplicateEmail(email));
    }

    let password_hash = password::hash_password(password)?;
    let created_at = Utc::now();
    let user_id = Uuid::new_v4().to_string();

    // A concurrent registration can still slip past the check above.
    if let Err(e) = conn
        .execute(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
            params![
                user_id.clone(),
                email.clone(),
                password_hash,
                created_at.format(TIMESTAMP_FORMAT).to_string()
            ],
        )
        .await
    {
        return Err(if is_unique_violation(&e) {
            CoreAccessError::DuplicateEmail(email)
        } else {
            e.into()
        });
    }

    info!(user_id = %user_id, "Registered new user.");
    Ok(User {
        id: user_id,
        email,
        created_at,
    })
}

/// Checks an email/password pair.
///
/// Unknown emails and wrong passwords are indistinguishable to the caller.
pub async fn authenticate(
    db: &Database,
    email: &str,
    password: &str,
) -> Result<User, CoreAccessError> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(CoreAccessError::MissingCredentials);
    }

    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT id, email, created_at, password_hash FROM users WHERE email = ?",
            params![email],
        )
        .await?;

    let Some(row) = rows.next().await? else {
        password::verify_password(password, None);
        warn!("Login attempt for unknown email.");
        return Err(CoreAccessError::InvalidCredentials);
    };

    let stored_hash: String = row.get(3)?;
    if !password::verify_password(password, Some(&stored_hash)) {
        warn!("Login attempt with a wrong password.");
        return Err(CoreAccessError::InvalidCredentials);
    }
    User::try_from(&row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use consulta::SqliteProvider;

    async fn setup() -> Database {
        let provider = SqliteProvider::new(":memory:").await.unwrap();
        provider.initialize_schema().await.unwrap();
        provider.db
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let db = setup().await;

        let user = register_user(&db, "  Ana@Example.com ", "s3cret-pass")
            .await
            .unwrap();
        assert_eq!(user.email, "ana@example.com");

        let logged_in = authenticate(&db, "ana@example.com", "s3cret-pass")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(
            logged_in.created_at.timestamp(),
            user.created_at.timestamp()
        );

        // The stored hash is never the plaintext.
        let conn = db.connect().unwrap();
        let mut rows = conn
            .query("SELECT password_hash FROM users WHERE id = ?", params![user.id])
            .await
            .unwrap();
        let stored: String = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_ne!(stored, "s3cret-pass");
        assert!(stored.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let db = setup().await;
        register_user(&db, "ana@example.com", "one").await.unwrap();

        let err = register_user(&db, "ANA@example.com", "two")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreAccessError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let db = setup().await;
        register_user(&db, "ana@example.com", "right").await.unwrap();

        let wrong_password = authenticate(&db, "ana@example.com", "wrong")
            .await
            .unwrap_err();
        let unknown_email = authenticate(&db, "nobody@example.com", "right")
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, CoreAccessError::InvalidCredentials));
        assert!(matches!(unknown_email, CoreAccessError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected() {
        let db = setup().await;
        assert!(matches!(
            register_user(&db, " ", "pw").await,
            Err(CoreAccessError::MissingCredentials)
        ));
        assert!(matches!(
            register_user(&db, "ana@example.com", "").await,
            Err(CoreAccessError::MissingCredentials)
        ));
        assert!(matches!(
            authenticate(&db, "", "pw").await,
            Err(CoreAccessError::MissingCredentials)
        ));
    }
}
