//! Bearer-token authentication gate.
//!
//! [`require_auth`] runs before every protected handler (installed with
//! `route_layer`), verifies the token, and stores the caller as an
//! [`AuthUser`] request extension. Handlers that want the caller take
//! [`AuthUser`] as an extractor.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tasktrack_core::error::CoreError;

use crate::auth::jwks::JwksError;
use crate::auth::jwt::AuthError;
use crate::error::AppError;
use crate::state::AppState;

/// The verified caller of a protected route.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Provider user id (`sub` claim), absent for machine-to-machine tokens.
    pub subject: Option<String>,
}

/// Reject the request with 401 unless it carries a valid bearer token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?.to_owned();

    let claims = state.verifier.verify(&token).await.map_err(|err| {
        match &err {
            AuthError::Key(JwksError::Http(_) | JwksError::Fetch(_) | JwksError::RateLimited) => {
                tracing::warn!(error = %err, "Signing key unavailable");
            }
            _ => tracing::debug!(error = %err, "Bearer token rejected"),
        }
        unauthorized("Invalid or expired token")
    })?;

    request
        .extensions_mut()
        .insert(AuthUser { subject: claims.sub });

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| unauthorized("Authentication required"))
    }
}
