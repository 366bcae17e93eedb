use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tasktrack_core::error::CoreError;

/// Error returned by handlers and the auth gate.
///
/// Every variant renders as `{"error": <message>, "code": <CODE>}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request could not be read: bad JSON, missing or mistyped field,
    /// wrong content type, or an unparsable path segment.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected request body");
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected path parameter");
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Core(CoreError::NotFound { .. }) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Core(CoreError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Core(CoreError::Unauthorized(_)) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Database(err) => match constraint_violation(err) {
                Some(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                None => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Core(CoreError::NotFound { entity, id }) => {
                format!("{entity} with id {id} not found")
            }
            AppError::Core(CoreError::Validation(msg))
            | AppError::Core(CoreError::Unauthorized(msg))
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::Database(err) => match constraint_violation(err) {
                Some(message) => message,
                None => "An internal error occurred".to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = json!({
            "error": self.message(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Describe a write rejected by a schema constraint, if that is what `err` is.
///
/// `23503` is a foreign-key violation (the referenced category or parent task
/// does not exist); `23514` is a `CHECK` violation (status or color got past
/// application validation). Anything else is an internal failure and its
/// details stay out of the response.
fn constraint_violation(err: &sqlx::Error) -> Option<String> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    let constraint = db_err.constraint().unwrap_or("unknown");

    match db_err.code().as_deref() {
        Some("23503") => Some(format!("Referenced record does not exist: {constraint}")),
        Some("23514") => Some(format!("Value violates check constraint: {constraint}")),
        _ => None,
    }
}
