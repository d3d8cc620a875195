//! View builders: compose repository reads with the aggregation core into the
//! response bodies of the three student endpoints. Each build is
//! all-or-nothing; a NotFound or store failure anywhere yields no partial view.

use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    AssignmentCounts, CourseSummary, CourseView, DashboardView, LessonDetail, LessonSummary,
    LessonView, Progress, StudentSummary, UnitView,
};
use crate::progress;
use crate::repository::Repository;

/// build_dashboard
///
/// Student identity/enrollment summary, overall and per-unit progress, and
/// the pending/total assignment counters.
pub async fn build_dashboard(
    repo: &dyn Repository,
    student_id: Uuid,
) -> Result<DashboardView, ApiError> {
    let student = repo
        .get_student_with_enrollment(student_id)
        .await?
        .ok_or(ApiError::NotFound("Student not found"))?;

    // Dashboard counters consider every lesson, enabled or not.
    let course = repo
        .get_course_structure(student.course_id, false)
        .await?
        .ok_or(ApiError::NotFound("Course not found"))?;

    let progress_rows = repo.get_progress(student_id).await?;

    let unit_ids: Vec<Uuid> = course.units.iter().map(|u| u.unit.id).collect();
    let pending = repo.count_pending_assignments(student_id, &unit_ids).await?;

    Ok(DashboardView {
        student: StudentSummary {
            id: student.id,
            full_name: student.full_name,
            email: student.email,
            group: student.group_code,
            course: student.course_code,
            student_type: student.student_type,
            status: student.status,
        },
        progress: progress::summarize(&course, &progress_rows),
        assignments: AssignmentCounts {
            pending,
            total: progress::total_assignment_lessons(&course),
        },
    })
}

/// build_course_view
///
/// Course summary plus, per unit, the student's completion and the enabled
/// lessons with their derived status. Disabled lessons are absent from the
/// response entirely. Ascending lesson order is a presentation contract, so
/// the builder sorts instead of trusting storage order.
pub async fn build_course_view(
    repo: &dyn Repository,
    student_id: Uuid,
) -> Result<CourseView, ApiError> {
    let student = repo
        .get_student_with_enrollment(student_id)
        .await?
        .ok_or(ApiError::NotFound("Student not found"))?;

    let course = repo
        .get_course_structure(student.course_id, true)
        .await?
        .ok_or(ApiError::NotFound("Course not found"))?;

    let progress_rows = repo.get_progress(student_id).await?;
    let completion = progress::completion_by_unit(&course, &progress_rows);
    let by_unit: HashMap<Uuid, &Progress> =
        progress_rows.iter().map(|p| (p.unit_id, p)).collect();

    let units = course
        .units
        .iter()
        .map(|u| {
            let unit_progress = by_unit.get(&u.unit.id).copied();

            let mut lessons: Vec<LessonSummary> = u
                .lessons
                .iter()
                .map(|lesson| {
                    let (status, completed_at) = progress::lesson_status(unit_progress, lesson.id);
                    LessonSummary {
                        id: lesson.id,
                        title: lesson.title.clone(),
                        order: lesson.order,
                        status,
                        completed_at,
                    }
                })
                .collect();
            lessons.sort_by_key(|l| l.order);

            UnitView {
                id: u.unit.id,
                unit_code: u.unit.unit_code.clone(),
                unit_name: u.unit.unit_name.clone(),
                term: u.unit.term.clone(),
                nature: u.unit.nature.clone(),
                completion: completion.get(&u.unit.id).copied().unwrap_or(0.0),
                lessons,
            }
        })
        .collect();

    Ok(CourseView {
        course: CourseSummary {
            id: course.course.id,
            course_code: course.course.course_code.clone(),
            title: course.course.title.clone(),
            course_type: course.course.course_type.clone(),
        },
        units,
    })
}

/// build_lesson_view
///
/// The access gate runs before anything is returned; only then are the lesson
/// metadata, the student's status for it, and the resources (verbatim)
/// assembled.
pub async fn build_lesson_view(
    repo: &dyn Repository,
    student_id: Uuid,
    lesson_id: Uuid,
) -> Result<LessonView, ApiError> {
    let path = repo.resolve_lesson_access_path(lesson_id, student_id).await?;
    let path = progress::ensure_lesson_access(path)?;

    let unit_progress = repo
        .get_unit_progress(student_id, path.lesson.unit_id)
        .await?;
    let (status, _) = progress::lesson_status(unit_progress.as_ref(), path.lesson.id);

    Ok(LessonView {
        lesson: LessonDetail {
            id: path.lesson.id,
            title: path.lesson.title,
            description: path.lesson.description,
            order: path.lesson.order,
            status,
        },
        resources: path.resources,
    })
}
