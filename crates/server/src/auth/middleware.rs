//! # Authentication Middleware
//!
//! This module provides the bearer-token gate. It defines an `AuthenticatedUser`
//! extractor that handlers take as an argument to require a valid token and to
//! get the caller's identity.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use core_access::{verify_token, Claims};
use serde_json::json;
use tracing::{debug, warn};

use crate::state::AppState;

/// The principal decoded from a valid bearer token.
///
/// - **No token present**: the request is rejected with `401` ("unauthenticated").
/// - **Invalid or expired token**: the request is rejected with `401`.
/// - **Valid token**: resolves to the `{id, email}` embedded at login. The
///   database is not consulted.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

/// A custom rejection type for authentication failures.
pub struct AuthError(StatusCode, String);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer_header =
            Option::<TypedHeader<Authorization<Bearer>>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    warn!("Malformed Authorization header: {}", e);
                    AuthError(
                        StatusCode::UNAUTHORIZED,
                        "Invalid or expired token.".to_string(),
                    )
                })?;

        let Some(TypedHeader(Authorization(bearer))) = bearer_header else {
            debug!("Request without Authorization header rejected.");
            return Err(AuthError(
                StatusCode::UNAUTHORIZED,
                "Token not provided.".to_string(),
            ));
        };

        let claims = verify_token(bearer.token(), &state.config.jwt_secret).map_err(|e| {
            warn!("JWT validation failed: {}", e);
            AuthError(
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token.".to_string(),
            )
        })?;

        Ok(AuthenticatedUser(claims))
    }
}
