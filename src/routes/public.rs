use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client.
/// This covers the health probe and the whole account lifecycle surface
/// (register, login, password reset), which must by nature work without a
/// session token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/student/register
        // Creates a PENDING student account and seeds a zeroed Progress row
        // for every unit of the chosen course.
        .route("/auth/student/register", post(handlers::register_student))
        // POST /auth/student/login
        // Verifies credentials and returns the enrollment summary plus a 24h token.
        .route("/auth/student/login", post(handlers::login_student))
        // POST /auth/student/resetpassword
        // Re-hashes and stores a new password for an existing email.
        .route(
            "/auth/student/resetpassword",
            post(handlers::reset_password),
        )
}
