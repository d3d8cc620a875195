//! Progress aggregation and lesson access gating.
//!
//! Everything in this module is a pure function of data already fetched for
//! the current request: no store handles, no shared state. The view builders
//! own the I/O and hand the results here.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    CourseStructure, LessonAccessPath, LessonStatus, LessonType, Progress, ProgressOverview,
    UnitProgressRow,
};

/// completion_by_unit
///
/// Maps each course unit to the student's completion for it, taken from the
/// matching Progress record. Units without a record simply have no entry;
/// callers read misses as 0 (the missing-record-means-zero rule).
///
/// A Progress record whose unit is not part of the course violates the
/// one-row-per-course-unit invariant. Such a record is logged and skipped;
/// the rest of the aggregation proceeds.
pub fn completion_by_unit(course: &CourseStructure, progress: &[Progress]) -> HashMap<Uuid, f64> {
    let unit_ids: HashSet<Uuid> = course.units.iter().map(|u| u.unit.id).collect();

    let mut completion = HashMap::new();
    for record in progress {
        if !unit_ids.contains(&record.unit_id) {
            tracing::warn!(
                progress_id = %record.id,
                unit_id = %record.unit_id,
                "progress record references a unit outside the student's course; skipping"
            );
            continue;
        }
        completion.insert(record.unit_id, record.completion);
    }
    completion
}

/// summarize
///
/// Produces the dashboard's progress block: the overall percentage plus one
/// `byUnit` row per course unit, in course order.
///
/// `overall` is the share of units whose completion is exactly 100, scaled to
/// a percentage. A course with zero units reports 0 rather than dividing by
/// zero. A student with no Progress rows reports 0 overall and 0 per unit.
pub fn summarize(course: &CourseStructure, progress: &[Progress]) -> ProgressOverview {
    let completion = completion_by_unit(course, progress);

    let total_units = course.units.len();
    let completed_units = completion.values().filter(|c| **c == 100.0).count();
    let overall = if total_units > 0 {
        completed_units as f64 / total_units as f64 * 100.0
    } else {
        0.0
    };

    let by_unit = course
        .units
        .iter()
        .map(|u| UnitProgressRow {
            unit_id: u.unit.id,
            unit_code: u.unit.unit_code.clone(),
            unit_name: u.unit.unit_name.clone(),
            completion: completion.get(&u.unit.id).copied().unwrap_or(0.0),
        })
        .collect();

    ProgressOverview { overall, by_unit }
}

/// total_assignment_lessons
///
/// Counts ASSIGNMENT-typed *lessons* across the course. This is the `total`
/// shown next to the pending count, which counts ASSIGNMENT-typed *resources*
/// instead; the two are different entities and are reported independently.
pub fn total_assignment_lessons(course: &CourseStructure) -> i64 {
    course
        .units
        .iter()
        .map(|u| {
            u.lessons
                .iter()
                .filter(|l| l.lesson_type == LessonType::Assignment)
                .count() as i64
        })
        .sum()
}

/// lesson_status
///
/// The student's status for one lesson: the first matching sub-record of the
/// unit's Progress row. No row, or no sub-record, reads as NOT_STARTED with
/// no completion timestamp.
pub fn lesson_status(
    unit_progress: Option<&Progress>,
    lesson_id: Uuid,
) -> (LessonStatus, Option<DateTime<Utc>>) {
    unit_progress
        .and_then(|p| p.lessons.iter().find(|l| l.lesson_id == lesson_id))
        .map(|l| (l.status, l.completed_at))
        .unwrap_or((LessonStatus::NotStarted, None))
}

/// ensure_lesson_access
///
/// The access gate. A student may view a lesson only if at least one group
/// linked to the lesson's course contains them. A missing lesson and a lesson
/// the student's group cannot reach produce the *same* NotFound, so the API
/// never reveals whether an inaccessible lesson exists.
pub fn ensure_lesson_access(path: Option<LessonAccessPath>) -> Result<LessonAccessPath, ApiError> {
    match path {
        Some(path) if !path.accessible_groups.is_empty() => Ok(path),
        _ => Err(ApiError::NotFound("Lesson not found or access denied")),
    }
}
