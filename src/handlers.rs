use crate::{
    AppState, auth,
    auth::AuthUser,
    error::ApiError,
    models::{
        CourseView, DashboardView, LessonView, LoginRequest, LoginResponse, MessageResponse,
        NewStudent, RegisterResponse, RegisterStudentRequest, ResetPasswordRequest,
    },
    views,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

// --- Account Handlers ---

/// register_student
///
/// [Public Route] Creates a student account.
///
/// *Flow*: resolve the group and course codes, hash the password, insert the
/// student with status PENDING, then seed one zeroed Progress row per unit of
/// the course. The seeding happens at registration so every later aggregation
/// can rely on a row existing per (student, unit) pair.
#[utoipa::path(
    post,
    path = "/auth/student/register",
    request_body = RegisterStudentRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterResponse),
        (status = 400, description = "Missing Fields"),
        (status = 404, description = "Unknown Group or Course"),
        (status = 409, description = "Email Taken")
    )
)]
pub async fn register_student(
    State(state): State<AppState>,
    Json(payload): Json<RegisterStudentRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if [
        &payload.full_name,
        &payload.email,
        &payload.password,
        &payload.group_code,
        &payload.course_code,
        &payload.student_type,
    ]
    .iter()
    .any(|field| field.trim().is_empty())
    {
        return Err(ApiError::Validation("All fields are required"));
    }

    if state
        .repo
        .get_student_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(ApiError::EmailTaken);
    }

    let group = state
        .repo
        .find_group_by_code(&payload.group_code)
        .await?
        .ok_or(ApiError::NotFound("Group not found"))?;

    let course = state
        .repo
        .find_course_by_code(&payload.course_code)
        .await?
        .ok_or(ApiError::NotFound("Course not found"))?;

    let password_hash = auth::hash_password(&payload.password)?;

    let student = state
        .repo
        .create_student(NewStudent {
            full_name: payload.full_name,
            email: payload.email,
            password_hash,
            student_type: payload.student_type,
            group_id: group.id,
            course_id: course.id,
        })
        .await?;

    let seeded = state.repo.seed_progress(student.id, course.id).await?;
    tracing::debug!(student_id = %student.id, rows = seeded, "seeded initial progress records");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: student.id,
            full_name: student.full_name,
            email: student.email,
            status: student.status,
            group: group.group_code,
            course: course.course_code,
        }),
    ))
}

/// login_student
///
/// [Public Route] Verifies credentials and issues a 24h bearer token.
///
/// Unknown email and wrong password produce the same 401 body. The account's
/// lifecycle status is *not* checked here; a PENDING student can log in but
/// the authenticated routes will reject the token until activation.
#[utoipa::path(
    post,
    path = "/auth/student/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged In", body = LoginResponse),
        (status = 400, description = "Missing Fields"),
        (status = 401, description = "Invalid Credentials")
    )
)]
pub async fn login_student(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.trim().is_empty() {
        return Err(ApiError::Validation("Email and password required"));
    }

    let student = state
        .repo
        .get_student_by_email(&payload.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !auth::verify_password(&payload.password, &student.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let token =
        auth::issue_token(student.id, &state.config.jwt_secret).map_err(|_| ApiError::Crypto)?;

    Ok(Json(LoginResponse {
        id: student.id,
        full_name: student.full_name,
        email: student.email,
        group: student.group_code,
        course: student.course_code,
        student_type: student.student_type,
        token,
    }))
}

/// reset_password
///
/// [Public Route] Replaces the stored password hash for an existing account.
#[utoipa::path(
    post,
    path = "/auth/student/resetpassword",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password Reset", body = MessageResponse),
        (status = 400, description = "Missing Fields"),
        (status = 404, description = "Unknown Email")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.email.trim().is_empty() || payload.new_password.trim().is_empty() {
        return Err(ApiError::Validation("Email and new password are required"));
    }

    let password_hash = auth::hash_password(&payload.new_password)?;

    if !state.repo.update_password(&payload.email, &password_hash).await? {
        return Err(ApiError::NotFound("Student not found"));
    }

    Ok(Json(MessageResponse {
        message: "Password reset successfully".to_string(),
    }))
}

// --- Student View Handlers ---

/// get_dashboard
///
/// [Authenticated Route] The student's landing view: enrollment summary,
/// overall and per-unit completion, pending/total assignment counts.
#[utoipa::path(
    get,
    path = "/student/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardView),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_dashboard(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardView>, ApiError> {
    let view = views::build_dashboard(state.repo.as_ref(), id).await?;
    Ok(Json(view))
}

/// get_courses
///
/// [Authenticated Route] The student's course with per-unit completion and
/// the enabled lessons in ascending order.
#[utoipa::path(
    get,
    path = "/student/courses",
    responses(
        (status = 200, description = "Course View", body = CourseView),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_courses(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<CourseView>, ApiError> {
    let view = views::build_course_view(state.repo.as_ref(), id).await?;
    Ok(Json(view))
}

/// get_lesson
///
/// [Authenticated Route] Detail view of one lesson, group-membership gated.
/// A lesson outside the student's reach and a nonexistent lesson return the
/// same 404.
#[utoipa::path(
    get,
    path = "/student/lessons/{lessonId}",
    params(("lessonId" = Uuid, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson", body = LessonView),
        (status = 404, description = "Not Found or Access Denied")
    )
)]
pub async fn get_lesson(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> Result<Json<LessonView>, ApiError> {
    let view = views::build_lesson_view(state.repo.as_ref(), id, lesson_id).await?;
    Ok(Json(view))
}
