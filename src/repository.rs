use crate::error::StoreError;
use crate::models::{
    Course, CourseStructure, Group, Lesson, LessonAccessPath, LessonProgress, LessonStatus,
    NewStudent, Progress, Resource, Student, StudentWithEnrollment, Unit, UnitWithLessons,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract read/write contract the portal core depends on. The
/// aggregation engine and the view builders only ever see this trait, never a
/// connection pool, which keeps them pure functions of fetched data and makes
/// them trivially testable against in-memory stubs.
///
/// Every method returns `Result<_, StoreError>`: a failed store round trip is
/// propagated to the caller and fails the enclosing view build. No retries
/// happen at this layer.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's async task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Identity & Enrollment Reads ---

    /// Plain student lookup by primary key. Used by the auth extractor to
    /// re-resolve the token subject on every request.
    async fn get_student(&self, id: Uuid) -> Result<Option<Student>, StoreError>;

    /// Student joined with its group/course codes. The dashboard's identity
    /// block is served straight from this row.
    async fn get_student_with_enrollment(
        &self,
        id: Uuid,
    ) -> Result<Option<StudentWithEnrollment>, StoreError>;

    /// Same join keyed by email; carries the password hash for login.
    async fn get_student_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StudentWithEnrollment>, StoreError>;

    // --- Curriculum Reads ---

    /// The structural tree of a course: units (by unit code) with their
    /// lessons sorted ascending by `order`. With `only_enabled`, disabled
    /// lessons are excluded at the source.
    async fn get_course_structure(
        &self,
        course_id: Uuid,
        only_enabled: bool,
    ) -> Result<Option<CourseStructure>, StoreError>;

    /// Everything needed to gate a lesson request: the lesson, its resources,
    /// and the groups that are linked to the lesson's course AND contain the
    /// student. `None` when the lesson does not exist.
    async fn resolve_lesson_access_path(
        &self,
        lesson_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<LessonAccessPath>, StoreError>;

    // --- Progress Reads ---

    /// All Progress rows of a student, each with its per-lesson sub-records
    /// attached. Deliberately unfiltered by course: the aggregator validates
    /// unit membership itself so that stray rows are observable.
    async fn get_progress(&self, student_id: Uuid) -> Result<Vec<Progress>, StoreError>;

    /// The single Progress row for one (student, unit) pair, if any.
    async fn get_unit_progress(
        &self,
        student_id: Uuid,
        unit_id: Uuid,
    ) -> Result<Option<Progress>, StoreError>;

    /// Anti-join count: ASSIGNMENT resources in the given units with no
    /// submission by this student.
    async fn count_pending_assignments(
        &self,
        student_id: Uuid,
        unit_ids: &[Uuid],
    ) -> Result<i64, StoreError>;

    // --- Registration & Credential Writes ---

    async fn find_group_by_code(&self, code: &str) -> Result<Option<Group>, StoreError>;
    async fn find_course_by_code(&self, code: &str) -> Result<Option<Course>, StoreError>;

    /// Inserts a student with status PENDING and returns the stored row.
    async fn create_student(&self, new: NewStudent) -> Result<Student, StoreError>;

    /// Creates one zeroed Progress row per unit of the course, in a single
    /// statement. Returns the number of rows created.
    async fn seed_progress(&self, student_id: Uuid, course_id: Uuid) -> Result<u64, StoreError>;

    /// Replaces the stored password hash for the given email. Returns false
    /// when no student has that email.
    async fn update_password(&self, email: &str, password_hash: &str)
    -> Result<bool, StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// All queries use the runtime sqlx API with bound parameters, so the crate
/// builds without a reachable database and no query string ever interpolates
/// user input.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches the `progress_lessons` sub-records for a set of Progress rows
    /// and groups them by owning row.
    async fn load_lesson_records(
        &self,
        progress_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<LessonProgress>>, StoreError> {
        let rows = sqlx::query_as::<_, ProgressLessonRow>(
            r#"
            SELECT progress_id, lesson_id, status, completed_at
            FROM progress_lessons
            WHERE progress_id = ANY($1)
            ORDER BY lesson_id ASC
            "#,
        )
        .bind(progress_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<LessonProgress>> = HashMap::new();
        for row in rows {
            grouped.entry(row.progress_id).or_default().push(LessonProgress {
                lesson_id: row.lesson_id,
                status: row.status,
                completed_at: row.completed_at,
            });
        }
        Ok(grouped)
    }
}

/// Flat row shape of the `progress_lessons` table. Only the repository sees
/// the `progress_id` grouping key; the public model nests the records instead.
#[derive(sqlx::FromRow)]
struct ProgressLessonRow {
    progress_id: Uuid,
    lesson_id: Uuid,
    status: LessonStatus,
    completed_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_student(&self, id: Uuid) -> Result<Option<Student>, StoreError> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, full_name, email, password_hash, status, "type", group_id, course_id, created_at
            FROM students
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    async fn get_student_with_enrollment(
        &self,
        id: Uuid,
    ) -> Result<Option<StudentWithEnrollment>, StoreError> {
        let student = sqlx::query_as::<_, StudentWithEnrollment>(
            r#"
            SELECT s.id, s.full_name, s.email, s.password_hash, s.status, s."type",
                   s.group_id, s.course_id, g.group_code, c.course_code
            FROM students s
            JOIN groups g ON g.id = s.group_id
            JOIN courses c ON c.id = s.course_id
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    async fn get_student_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StudentWithEnrollment>, StoreError> {
        let student = sqlx::query_as::<_, StudentWithEnrollment>(
            r#"
            SELECT s.id, s.full_name, s.email, s.password_hash, s.status, s."type",
                   s.group_id, s.course_id, g.group_code, c.course_code
            FROM students s
            JOIN groups g ON g.id = s.group_id
            JOIN courses c ON c.id = s.course_id
            WHERE s.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    /// get_course_structure
    ///
    /// Assembles the course tree in three round trips (course, units,
    /// lessons) rather than one join, keeping the row mapping trivial. The
    /// lesson ordering (`"order" ASC`) is part of this method's contract.
    async fn get_course_structure(
        &self,
        course_id: Uuid,
        only_enabled: bool,
    ) -> Result<Option<CourseStructure>, StoreError> {
        let Some(course) = sqlx::query_as::<_, Course>(
            r#"SELECT id, course_code, title, "type" FROM courses WHERE id = $1"#,
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let units = sqlx::query_as::<_, Unit>(
            r#"
            SELECT id, course_id, unit_code, unit_name, term, nature
            FROM units
            WHERE course_id = $1
            ORDER BY unit_code ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let unit_ids: Vec<Uuid> = units.iter().map(|u| u.id).collect();

        // One lesson query for the whole course; the enabled filter is only
        // applied for presentation-facing variants.
        let sql = if only_enabled {
            r#"
            SELECT id, unit_id, title, description, "order", "type", enabled
            FROM lessons
            WHERE unit_id = ANY($1) AND enabled = true
            ORDER BY "order" ASC
            "#
        } else {
            r#"
            SELECT id, unit_id, title, description, "order", "type", enabled
            FROM lessons
            WHERE unit_id = ANY($1)
            ORDER BY "order" ASC
            "#
        };

        let lessons = sqlx::query_as::<_, Lesson>(sql)
            .bind(&unit_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut by_unit: HashMap<Uuid, Vec<Lesson>> = HashMap::new();
        for lesson in lessons {
            by_unit.entry(lesson.unit_id).or_default().push(lesson);
        }

        let units = units
            .into_iter()
            .map(|unit| {
                let lessons = by_unit.remove(&unit.id).unwrap_or_default();
                UnitWithLessons { unit, lessons }
            })
            .collect();

        Ok(Some(CourseStructure { course, units }))
    }

    /// resolve_lesson_access_path
    ///
    /// The `accessible_groups` query walks lesson -> unit -> course ->
    /// course_groups and intersects with the student's own group membership,
    /// so an empty result means either "no such linkage" or "student not in
    /// any linked group". The gate treats both the same.
    async fn resolve_lesson_access_path(
        &self,
        lesson_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<LessonAccessPath>, StoreError> {
        let Some(lesson) = sqlx::query_as::<_, Lesson>(
            r#"
            SELECT id, unit_id, title, description, "order", "type", enabled
            FROM lessons
            WHERE id = $1
            "#,
        )
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let resources = sqlx::query_as::<_, Resource>(
            r#"
            SELECT id, unit_id, lesson_id, title, "type", url
            FROM resources
            WHERE lesson_id = $1
            "#,
        )
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await?;

        let accessible_groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT g.id, g.group_code
            FROM groups g
            JOIN course_groups cg ON cg.group_id = g.id
            JOIN units u ON u.course_id = cg.course_id
            JOIN students s ON s.group_id = g.id
            WHERE u.id = $1 AND s.id = $2
            "#,
        )
        .bind(lesson.unit_id)
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(LessonAccessPath {
            lesson,
            resources,
            accessible_groups,
        }))
    }

    async fn get_progress(&self, student_id: Uuid) -> Result<Vec<Progress>, StoreError> {
        let mut rows = sqlx::query_as::<_, Progress>(
            r#"
            SELECT id, student_id, unit_id, completion
            FROM progress
            WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
        let mut lesson_records = self.load_lesson_records(&ids).await?;
        for row in &mut rows {
            row.lessons = lesson_records.remove(&row.id).unwrap_or_default();
        }
        Ok(rows)
    }

    async fn get_unit_progress(
        &self,
        student_id: Uuid,
        unit_id: Uuid,
    ) -> Result<Option<Progress>, StoreError> {
        let Some(mut row) = sqlx::query_as::<_, Progress>(
            r#"
            SELECT id, student_id, unit_id, completion
            FROM progress
            WHERE student_id = $1 AND unit_id = $2
            "#,
        )
        .bind(student_id)
        .bind(unit_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let mut lesson_records = self.load_lesson_records(&[row.id]).await?;
        row.lessons = lesson_records.remove(&row.id).unwrap_or_default();
        Ok(Some(row))
    }

    /// count_pending_assignments
    ///
    /// The NOT EXISTS sub-select is the anti-join: an ASSIGNMENT resource
    /// counts as pending exactly while this student has no submission for it.
    async fn count_pending_assignments(
        &self,
        student_id: Uuid,
        unit_ids: &[Uuid],
    ) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM resources r
            WHERE r.unit_id = ANY($2)
              AND r."type" = 'ASSIGNMENT'
              AND NOT EXISTS (
                  SELECT 1 FROM submissions s
                  WHERE s.resource_id = r.id AND s.student_id = $1
              )
            "#,
        )
        .bind(student_id)
        .bind(unit_ids)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn find_group_by_code(&self, code: &str) -> Result<Option<Group>, StoreError> {
        let group =
            sqlx::query_as::<_, Group>(r#"SELECT id, group_code FROM groups WHERE group_code = $1"#)
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;
        Ok(group)
    }

    async fn find_course_by_code(&self, code: &str) -> Result<Option<Course>, StoreError> {
        let course = sqlx::query_as::<_, Course>(
            r#"SELECT id, course_code, title, "type" FROM courses WHERE course_code = $1"#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(course)
    }

    async fn create_student(&self, new: NewStudent) -> Result<Student, StoreError> {
        let new_id = Uuid::new_v4();
        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (id, full_name, email, password_hash, status, "type", group_id, course_id, created_at)
            VALUES ($1, $2, $3, $4, 'PENDING', $5, $6, $7, NOW())
            RETURNING id, full_name, email, password_hash, status, "type", group_id, course_id, created_at
            "#,
        )
        .bind(new_id)
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.student_type)
        .bind(new.group_id)
        .bind(new.course_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(student)
    }

    /// seed_progress
    ///
    /// INSERT .. SELECT creates every row in one statement so a partially
    /// seeded student cannot be observed.
    async fn seed_progress(&self, student_id: Uuid, course_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO progress (id, student_id, unit_id, completion)
            SELECT gen_random_uuid(), $1, u.id, 0
            FROM units u
            WHERE u.course_id = $2
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update_password(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(r#"UPDATE students SET password_hash = $2 WHERE email = $1"#)
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
