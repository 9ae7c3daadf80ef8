//! Password hashing and verification (argon2id, random salt, PHC strings).

use crate::CoreAccessError;
use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::LazyLock;

static DEFAULT_HASHER: LazyLock<Argon2<'static>> = LazyLock::new(Argon2::default);

/// Hash of the empty password, verified against when the user does not exist
/// so that unknown emails cost the same time as wrong passwords.
static EMPTY_HASH: LazyLock<Option<String>> = LazyLock::new(|| hash_password("").ok());

/// Hashes a plaintext password with a freshly generated salt.
pub fn hash_password(password: &str) -> Result<String, CoreAccessError> {
    let salt = SaltString::generate(&mut OsRng);
    DEFAULT_HASHER
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreAccessError::Hashing(e.to_string()))
}

/// Checks `password` against a stored PHC string.
///
/// When no hash is given the password is still checked against a dummy hash
/// and the result is always `false`.
pub fn verify_password(password: &str, stored_hash: Option<&str>) -> bool {
    let (candidate, known_user) = match stored_hash {
        Some(hash) => (Some(hash), true),
        None => (EMPTY_HASH.as_deref(), false),
    };
    let Some(Ok(parsed)) = candidate.map(PasswordHash::new) else {
        return false;
    };
    let matches = DEFAULT_HASHER
        .verify_password(password.as_bytes(), &parsed)
        .is_ok();
    matches && known_user
}
