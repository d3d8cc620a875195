use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Domain Enumerations (Mapped to Postgres enum types) ---

/// StudentStatus
///
/// Lifecycle state of a student account. New registrations start as `Pending`
/// and must be activated before the authenticated routes accept their tokens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type, Serialize, Deserialize, TS, ToSchema,
)]
#[sqlx(type_name = "student_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum StudentStatus {
    #[default]
    Pending,
    Active,
    Suspended,
}

/// LessonStatus
///
/// Per-student state of a single lesson, stored in the progress sub-records.
/// A lesson with no sub-record is reported as `NotStarted`; the absence of a
/// row and an explicit NOT_STARTED row are indistinguishable on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type, Serialize, Deserialize, TS, ToSchema,
)]
#[sqlx(type_name = "lesson_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum LessonStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// LessonType
///
/// Structural classification of a lesson. `Assignment` lessons feed the
/// dashboard's total-assignment counter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type, Serialize, Deserialize, TS, ToSchema,
)]
#[sqlx(type_name = "lesson_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum LessonType {
    #[default]
    Lecture,
    Assignment,
}

/// ResourceType
///
/// Classification of an attached resource. `Assignment` resources are the
/// entities counted by the pending-assignment anti-join; they are a separate
/// concept from `LessonType::Assignment` and the two counters are not
/// reconciled.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type, Serialize, Deserialize, TS, ToSchema,
)]
#[sqlx(type_name = "resource_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ResourceType {
    #[default]
    Document,
    Assignment,
}

// --- Core Application Schemas (Mapped to Database) ---

/// Student
///
/// The canonical student record from the `students` table. Each student is
/// enrolled in exactly one group and one course; both foreign keys are
/// mandatory at registration time.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Student {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,

    /// Argon2 PHC string. Never serialized into any response.
    #[serde(skip)]
    pub password_hash: String,

    pub status: StudentStatus,

    /// Maps the SQL column "type" to a legal Rust field name while keeping
    /// the original JSON key.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub student_type: String,

    pub group_id: Uuid,
    pub course_id: Uuid,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// StudentWithEnrollment
///
/// A student row joined with the codes of its group and course. This is the
/// flat read model the dashboard builder and the login flow start from, so
/// neither has to issue separate lookups for enrollment display fields.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StudentWithEnrollment {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,

    #[serde(skip)]
    pub password_hash: String,

    pub status: StudentStatus,

    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub student_type: String,

    pub group_id: Uuid,
    pub course_id: Uuid,
    pub group_code: String,
    pub course_code: String,
}

/// Group
///
/// A cohort of students. The `group_code` is the stable public identifier
/// used at registration and in every response payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Group {
    pub id: Uuid,
    pub group_code: String,
}

/// Course
///
/// A course of study. Linked many-to-many with groups via `course_groups`;
/// that link set is what the lesson access gate checks.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Course {
    pub id: Uuid,
    pub course_code: String,
    pub title: String,

    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub course_type: String,
}

/// Unit
///
/// A subdivision of a course (module/topic). Owns an ordered collection of
/// lessons and is the granularity at which completion is tracked.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Unit {
    pub id: Uuid,
    pub course_id: Uuid,
    pub unit_code: String,
    pub unit_name: String,
    pub term: String,
    pub nature: String,
}

/// Lesson
///
/// An ordered content item within a unit. `order` defines the presentation
/// sequence; `enabled = false` removes the lesson from the course view
/// entirely rather than merely hiding it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Lesson {
    pub id: Uuid,
    pub unit_id: Uuid,
    pub title: String,
    pub description: String,
    pub order: i32,

    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub lesson_type: LessonType,

    pub enabled: bool,
}

/// Resource
///
/// An artifact attached to a lesson. Returned verbatim in the lesson-detail
/// view. Submissions against a resource live in their own table and are only
/// observed here through the pending-assignment count.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Resource {
    pub id: Uuid,
    pub unit_id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,

    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub resource_type: ResourceType,

    pub url: Option<String>,
}

/// Progress
///
/// One record per (student, unit) pair, created zeroed at registration for
/// every unit of the student's course. `completion` is a percentage in
/// [0, 100]; the nested `lessons` sub-records carry per-lesson status.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Progress {
    pub id: Uuid,
    pub student_id: Uuid,
    pub unit_id: Uuid,
    pub completion: f64,

    /// Loaded from `progress_lessons` in a second query and attached by the
    /// repository; not a column of the `progress` table itself.
    #[sqlx(skip)]
    pub lessons: Vec<LessonProgress>,
}

/// LessonProgress
///
/// A per-lesson status sub-record nested under a Progress row.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LessonProgress {
    pub lesson_id: Uuid,
    pub status: LessonStatus,

    #[ts(type = "string | null")]
    pub completed_at: Option<DateTime<Utc>>,
}

// --- Assembled Read Models (built by the repository, never FromRow) ---

/// UnitWithLessons
///
/// A unit together with its lessons, already filtered/ordered by the
/// repository according to the requested course-structure variant.
#[derive(Debug, Clone, Default)]
pub struct UnitWithLessons {
    pub unit: Unit,
    pub lessons: Vec<Lesson>,
}

/// CourseStructure
///
/// The full structural tree of a course: course row plus its units, each
/// with lessons. This is the aggregation engine's primary input.
#[derive(Debug, Clone, Default)]
pub struct CourseStructure {
    pub course: Course,
    pub units: Vec<UnitWithLessons>,
}

/// LessonAccessPath
///
/// Everything the access gate needs to decide whether a student may view a
/// lesson: the lesson itself, its resources, and the set of groups that are
/// linked to the lesson's course AND contain the student. An empty group set
/// means denial.
#[derive(Debug, Clone, Default)]
pub struct LessonAccessPath {
    pub lesson: Lesson,
    pub resources: Vec<Resource>,
    pub accessible_groups: Vec<Group>,
}

/// NewStudent
///
/// The validated, hashed insert payload for a student row. Constructed by the
/// registration handler after group/course resolution and password hashing.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub student_type: String,
    pub group_id: Uuid,
    pub course_id: Uuid,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterStudentRequest
///
/// Input payload for POST /auth/student/register. All fields are required;
/// blank values are rejected with a 400 before any store access.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterStudentRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub group_code: String,
    pub course_code: String,

    #[serde(rename = "type")]
    pub student_type: String,
}

/// LoginRequest
///
/// Input payload for POST /auth/student/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// ResetPasswordRequest
///
/// Input payload for POST /auth/student/resetpassword.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
}

// --- Response Payloads (Output Schemas) ---

/// RegisterResponse
///
/// Output of a successful registration. The group/course fields carry the
/// public codes, not the internal UUIDs.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub status: StudentStatus,
    pub group: String,
    pub course: String,
}

/// LoginResponse
///
/// Output of a successful login: enrollment summary plus a 24h bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub group: String,
    pub course: String,

    #[serde(rename = "type")]
    pub student_type: String,

    pub token: String,
}

/// MessageResponse
///
/// Generic `{ "message": ... }` acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

// --- Dashboard View Schemas ---

/// StudentSummary
///
/// Identity/enrollment block of the dashboard response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StudentSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub group: String,
    pub course: String,

    #[serde(rename = "type")]
    pub student_type: String,

    pub status: StudentStatus,
}

/// UnitProgressRow
///
/// One `byUnit` entry: a course unit with the student's completion for it.
/// Units without a Progress record appear here with completion 0.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UnitProgressRow {
    pub unit_id: Uuid,
    pub unit_code: String,
    pub unit_name: String,
    pub completion: f64,
}

/// ProgressOverview
///
/// Overall percentage plus the per-unit breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProgressOverview {
    pub overall: f64,
    pub by_unit: Vec<UnitProgressRow>,
}

/// AssignmentCounts
///
/// Pending counts ASSIGNMENT resources without a submission by this student;
/// total counts ASSIGNMENT lessons across the course. Two different source
/// entities, kept as two independent metrics.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AssignmentCounts {
    pub pending: i64,
    pub total: i64,
}

/// DashboardView
///
/// Response body of GET /student/dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardView {
    pub student: StudentSummary,
    pub progress: ProgressOverview,
    pub assignments: AssignmentCounts,
}

// --- Course View Schemas ---

/// CourseSummary
///
/// Course header block of the course view.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CourseSummary {
    pub id: Uuid,
    pub course_code: String,
    pub title: String,

    #[serde(rename = "type")]
    pub course_type: String,
}

/// LessonSummary
///
/// One lesson row of the course view: enabled lessons only, ascending by
/// `order`, with the student's derived status. `completedAt` is omitted from
/// the JSON entirely when the lesson has never been completed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LessonSummary {
    pub id: Uuid,
    pub title: String,
    pub order: i32,
    pub status: LessonStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// UnitView
///
/// One unit of the course view with its completion and lesson list.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UnitView {
    pub id: Uuid,
    pub unit_code: String,
    pub unit_name: String,
    pub term: String,
    pub nature: String,
    pub completion: f64,
    pub lessons: Vec<LessonSummary>,
}

/// CourseView
///
/// Response body of GET /student/courses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CourseView {
    pub course: CourseSummary,
    pub units: Vec<UnitView>,
}

// --- Lesson Detail Schemas ---

/// LessonDetail
///
/// Lesson metadata plus the requesting student's status for it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LessonDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub order: i32,
    pub status: LessonStatus,
}

/// LessonView
///
/// Response body of GET /student/lessons/{lessonId}. Only produced after the
/// access gate has passed; the resources are returned verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LessonView {
    pub lesson: LessonDetail,
    pub resources: Vec<Resource>,
}
