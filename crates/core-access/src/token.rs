//! Signed, time-limited bearer tokens (HS256 JWT) carrying `{id, email}`.

use crate::{CoreAccessError, User};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Default token lifetime: one hour.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// The claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// The user's id.
    pub id: String,
    pub email: String,
    /// Expiration as a UNIX timestamp in seconds.
    pub exp: usize,
}

impl Claims {
    /// Claims for `user` expiring `ttl_secs` from now.
    pub fn for_user(user: &User, ttl_secs: u64) -> Self {
        let now = Utc::now().timestamp().max(0) as u64;
        Claims {
            id: user.id.clone(),
            email: user.email.clone(),
            exp: (now + ttl_secs) as usize,
        }
    }
}

pub fn sign(claims: &Claims, secret: &str) -> Result<String, CoreAccessError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(CoreAccessError::from)
}

/// Issues a token for a freshly authenticated user.
pub fn issue_token(user: &User, secret: &str, ttl_secs: u64) -> Result<String, CoreAccessError> {
    sign(&Claims::for_user(user, ttl_secs), secret)
}

/// Verifies signature and expiry (no leeway) and returns the embedded claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, CoreAccessError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| CoreAccessError::InvalidToken(e.to_string()))
}
