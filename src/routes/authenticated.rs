use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Defines the read-oriented student views, nested under `/student` by the
/// top-level router. Every handler here relies on the `AuthUser` extractor
/// middleware being layered above this module, which guarantees the request
/// belongs to an existing, ACTIVE student before any view is built.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /student/dashboard
        // Enrollment summary, overall/per-unit completion, assignment counters.
        .route("/dashboard", get(handlers::get_dashboard))
        // GET /student/courses
        // The student's course tree: per-unit completion plus enabled lessons
        // in ascending order with derived status.
        .route("/courses", get(handlers::get_courses))
        // GET /student/lessons/{lessonId}
        // Lesson detail, gated on the student's group being linked to the
        // lesson's course. Denial and nonexistence are the same 404.
        .route("/lessons/{lessonId}", get(handlers::get_lesson))
}
