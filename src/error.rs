use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// StoreError
///
/// Signals that a read or write against the persistence layer failed
/// (connection refused, timeout, malformed row). The driver-level detail is
/// captured as a message so that mock repositories can fabricate failures
/// without depending on a concrete database driver.
#[derive(Debug, Clone, thiserror::Error)]
#[error("store unavailable: {0}")]
pub struct StoreError(pub String);

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError(e.to_string())
    }
}

/// ApiError
///
/// The application-level error taxonomy. Every fallible handler and view
/// builder surfaces one of these variants; nothing is caught and suppressed
/// below this level. The `IntoResponse` impl maps each variant to the
/// HTTP status and `{"error": ...}` body the frontend contract expects.
///
/// Access denial is intentionally reported as `NotFound`: the API does not
/// reveal whether a lesson the student may not view exists at all.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested student/course/lesson is absent, or the student's group
    /// does not grant access to it. 404.
    #[error("{0}")]
    NotFound(&'static str),

    /// A request payload failed a required-field check. 400.
    #[error("{0}")]
    Validation(&'static str),

    /// Unknown email or password mismatch. The two cases share one message. 401.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Registration attempted with an email that already has an account. 409.
    #[error("Email already registered")]
    EmailTaken,

    /// Credential machinery failed: password hashing (bad salt, corrupt
    /// stored hash) or token signing. Never caused by a wrong password. 500.
    #[error("credential processing failed")]
    Crypto,

    /// A collaborator read/write failed. Propagated, not retried. 500.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::EmailTaken => (StatusCode::CONFLICT, self.to_string()),
            ApiError::Crypto => {
                tracing::error!("credential processing failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong!".to_string(),
                )
            }
            ApiError::Store(e) => {
                // Log the underlying driver error for debugging but return a generic body.
                tracing::error!("store failure surfaced to client: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong!".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
