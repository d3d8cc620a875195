#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use student_portal::{
    AppState,
    config::AppConfig,
    create_router,
    error::StoreError,
    models::{
        Course, CourseStructure, Group, Lesson, LessonAccessPath, LessonProgress, LessonStatus,
        LessonType, NewStudent, Progress, Resource, ResourceType, Student, StudentStatus,
        StudentWithEnrollment, Unit, UnitWithLessons,
    },
    repository::Repository,
};

/// FixtureRepo
///
/// An in-memory Repository implementation driven entirely by plain vectors,
/// so every view-builder and handler test runs without a database. With
/// `fail = true` every method simulates an unreachable store.
#[derive(Default)]
pub struct FixtureRepo {
    pub students: Vec<StudentWithEnrollment>,
    pub groups: Vec<Group>,
    pub courses: Vec<Course>,
    pub course: Option<CourseStructure>,
    /// Group ids linked to the fixture course (the access-gate link set).
    pub course_groups: Vec<Uuid>,
    pub progress: Vec<Progress>,
    pub resources: Vec<Resource>,
    /// (resource_id, student_id) pairs.
    pub submissions: Vec<(Uuid, Uuid)>,
    /// Students inserted through `create_student`, for assertions.
    pub created: Mutex<Vec<Student>>,
    pub fail: bool,
}

impl FixtureRepo {
    fn check(&self) -> Result<(), StoreError> {
        if self.fail {
            Err(StoreError("simulated connection failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn to_student(s: &StudentWithEnrollment) -> Student {
        Student {
            id: s.id,
            full_name: s.full_name.clone(),
            email: s.email.clone(),
            password_hash: s.password_hash.clone(),
            status: s.status,
            student_type: s.student_type.clone(),
            group_id: s.group_id,
            course_id: s.course_id,
            created_at: Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap(),
        }
    }
}

#[async_trait]
impl Repository for FixtureRepo {
    async fn get_student(&self, id: Uuid) -> Result<Option<Student>, StoreError> {
        self.check()?;
        Ok(self
            .students
            .iter()
            .find(|s| s.id == id)
            .map(Self::to_student))
    }

    async fn get_student_with_enrollment(
        &self,
        id: Uuid,
    ) -> Result<Option<StudentWithEnrollment>, StoreError> {
        self.check()?;
        Ok(self.students.iter().find(|s| s.id == id).cloned())
    }

    async fn get_student_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StudentWithEnrollment>, StoreError> {
        self.check()?;
        Ok(self.students.iter().find(|s| s.email == email).cloned())
    }

    async fn get_course_structure(
        &self,
        course_id: Uuid,
        only_enabled: bool,
    ) -> Result<Option<CourseStructure>, StoreError> {
        self.check()?;
        let Some(course) = self.course.as_ref().filter(|c| c.course.id == course_id) else {
            return Ok(None);
        };

        let mut course = course.clone();
        if only_enabled {
            for unit in &mut course.units {
                unit.lessons.retain(|l| l.enabled);
            }
        }
        // Lessons are intentionally left in insertion order here; the view
        // builder owns the ascending-order presentation contract.
        Ok(Some(course))
    }

    async fn resolve_lesson_access_path(
        &self,
        lesson_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<LessonAccessPath>, StoreError> {
        self.check()?;
        let Some(course) = self.course.as_ref() else {
            return Ok(None);
        };
        let Some(lesson) = course
            .units
            .iter()
            .flat_map(|u| u.lessons.iter())
            .find(|l| l.id == lesson_id)
        else {
            return Ok(None);
        };

        let resources = self
            .resources
            .iter()
            .filter(|r| r.lesson_id == lesson_id)
            .cloned()
            .collect();

        let accessible_groups = self
            .students
            .iter()
            .find(|s| s.id == student_id)
            .filter(|s| self.course_groups.contains(&s.group_id))
            .map(|s| {
                vec![Group {
                    id: s.group_id,
                    group_code: s.group_code.clone(),
                }]
            })
            .unwrap_or_default();

        Ok(Some(LessonAccessPath {
            lesson: lesson.clone(),
            resources,
            accessible_groups,
        }))
    }

    async fn get_progress(&self, student_id: Uuid) -> Result<Vec<Progress>, StoreError> {
        self.check()?;
        Ok(self
            .progress
            .iter()
            .filter(|p| p.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn get_unit_progress(
        &self,
        student_id: Uuid,
        unit_id: Uuid,
    ) -> Result<Option<Progress>, StoreError> {
        self.check()?;
        Ok(self
            .progress
            .iter()
            .find(|p| p.student_id == student_id && p.unit_id == unit_id)
            .cloned())
    }

    async fn count_pending_assignments(
        &self,
        student_id: Uuid,
        unit_ids: &[Uuid],
    ) -> Result<i64, StoreError> {
        self.check()?;
        let count = self
            .resources
            .iter()
            .filter(|r| {
                unit_ids.contains(&r.unit_id)
                    && r.resource_type == ResourceType::Assignment
                    && !self
                        .submissions
                        .iter()
                        .any(|(res, stu)| *res == r.id && *stu == student_id)
            })
            .count();
        Ok(count as i64)
    }

    async fn find_group_by_code(&self, code: &str) -> Result<Option<Group>, StoreError> {
        self.check()?;
        Ok(self.groups.iter().find(|g| g.group_code == code).cloned())
    }

    async fn find_course_by_code(&self, code: &str) -> Result<Option<Course>, StoreError> {
        self.check()?;
        Ok(self.courses.iter().find(|c| c.course_code == code).cloned())
    }

    async fn create_student(&self, new: NewStudent) -> Result<Student, StoreError> {
        self.check()?;
        let student = Student {
            id: Uuid::new_v4(),
            full_name: new.full_name,
            email: new.email,
            password_hash: new.password_hash,
            status: StudentStatus::Pending,
            student_type: new.student_type,
            group_id: new.group_id,
            course_id: new.course_id,
            created_at: Utc::now(),
        };
        self.created.lock().unwrap().push(student.clone());
        Ok(student)
    }

    async fn seed_progress(&self, _student_id: Uuid, course_id: Uuid) -> Result<u64, StoreError> {
        self.check()?;
        let rows = self
            .course
            .as_ref()
            .filter(|c| c.course.id == course_id)
            .map(|c| c.units.len())
            .unwrap_or(0);
        Ok(rows as u64)
    }

    async fn update_password(
        &self,
        email: &str,
        _password_hash: &str,
    ) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self.students.iter().any(|s| s.email == email))
    }
}

// --- Canonical Fixture ---

/// Deterministic ids so failures read well.
pub const STUDENT_ID: Uuid = Uuid::from_u128(0x10);
pub const OUTSIDER_ID: Uuid = Uuid::from_u128(0x11);
pub const GROUP_ID: Uuid = Uuid::from_u128(0x20);
pub const OUTSIDER_GROUP_ID: Uuid = Uuid::from_u128(0x21);
pub const COURSE_ID: Uuid = Uuid::from_u128(0x30);
pub const UNIT1_ID: Uuid = Uuid::from_u128(0x40);
pub const UNIT2_ID: Uuid = Uuid::from_u128(0x41);
pub const LESSON_COMPLETED: Uuid = Uuid::from_u128(0x50); // U1, order 2
pub const LESSON_IN_PROGRESS: Uuid = Uuid::from_u128(0x51); // U1, order 1, ASSIGNMENT
pub const LESSON_DISABLED: Uuid = Uuid::from_u128(0x52); // U1, order 3, disabled
pub const LESSON_U2: Uuid = Uuid::from_u128(0x53); // U2, order 1
pub const RESOURCE_PENDING: Uuid = Uuid::from_u128(0x60); // ASSIGNMENT, no submission
pub const RESOURCE_DOCUMENT: Uuid = Uuid::from_u128(0x61);
pub const RESOURCE_SUBMITTED: Uuid = Uuid::from_u128(0x62); // ASSIGNMENT, submitted

fn lesson(id: Uuid, unit_id: Uuid, title: &str, order: i32, kind: LessonType, enabled: bool) -> Lesson {
    Lesson {
        id,
        unit_id,
        title: title.to_string(),
        description: format!("{title} description"),
        order,
        lesson_type: kind,
        enabled,
    }
}

/// The canonical world: one course (two units), one enrolled student with
/// unit completions 100/40, one outsider whose group is not linked to the
/// course, one pending and one submitted assignment resource.
pub fn fixture() -> FixtureRepo {
    let unit1 = Unit {
        id: UNIT1_ID,
        course_id: COURSE_ID,
        unit_code: "CS101-U1".to_string(),
        unit_name: "Foundations".to_string(),
        term: "Semester 1".to_string(),
        nature: "CORE".to_string(),
    };
    let unit2 = Unit {
        id: UNIT2_ID,
        course_id: COURSE_ID,
        unit_code: "CS101-U2".to_string(),
        unit_name: "Applications".to_string(),
        term: "Semester 2".to_string(),
        nature: "CORE".to_string(),
    };

    // Unit 1 lessons are deliberately out of order; the course view must
    // present them ascending regardless.
    let course = CourseStructure {
        course: Course {
            id: COURSE_ID,
            course_code: "CS101".to_string(),
            title: "Computer Science".to_string(),
            course_type: "UNDERGRADUATE".to_string(),
        },
        units: vec![
            UnitWithLessons {
                unit: unit1,
                lessons: vec![
                    lesson(LESSON_COMPLETED, UNIT1_ID, "Variables", 2, LessonType::Lecture, true),
                    lesson(
                        LESSON_IN_PROGRESS,
                        UNIT1_ID,
                        "Hello World",
                        1,
                        LessonType::Assignment,
                        true,
                    ),
                    lesson(LESSON_DISABLED, UNIT1_ID, "Draft Lesson", 3, LessonType::Lecture, false),
                ],
            },
            UnitWithLessons {
                unit: unit2,
                lessons: vec![lesson(LESSON_U2, UNIT2_ID, "Projects", 1, LessonType::Lecture, true)],
            },
        ],
    };

    let student = StudentWithEnrollment {
        id: STUDENT_ID,
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        password_hash: String::new(),
        status: StudentStatus::Active,
        student_type: "FULL_TIME".to_string(),
        group_id: GROUP_ID,
        course_id: COURSE_ID,
        group_code: "G1".to_string(),
        course_code: "CS101".to_string(),
    };

    let outsider = StudentWithEnrollment {
        id: OUTSIDER_ID,
        full_name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        password_hash: String::new(),
        status: StudentStatus::Active,
        student_type: "FULL_TIME".to_string(),
        group_id: OUTSIDER_GROUP_ID,
        course_id: COURSE_ID,
        group_code: "G2".to_string(),
        course_code: "CS101".to_string(),
    };

    let progress = vec![
        Progress {
            id: Uuid::from_u128(0x70),
            student_id: STUDENT_ID,
            unit_id: UNIT1_ID,
            completion: 100.0,
            lessons: vec![
                LessonProgress {
                    lesson_id: LESSON_COMPLETED,
                    status: LessonStatus::Completed,
                    completed_at: Some(Utc.with_ymd_and_hms(2025, 10, 5, 12, 0, 0).unwrap()),
                },
                LessonProgress {
                    lesson_id: LESSON_IN_PROGRESS,
                    status: LessonStatus::InProgress,
                    completed_at: None,
                },
            ],
        },
        Progress {
            id: Uuid::from_u128(0x71),
            student_id: STUDENT_ID,
            unit_id: UNIT2_ID,
            completion: 40.0,
            lessons: vec![],
        },
    ];

    let resources = vec![
        Resource {
            id: RESOURCE_PENDING,
            unit_id: UNIT1_ID,
            lesson_id: LESSON_COMPLETED,
            title: "Worksheet".to_string(),
            resource_type: ResourceType::Assignment,
            url: Some("https://files.example.com/worksheet.pdf".to_string()),
        },
        Resource {
            id: RESOURCE_DOCUMENT,
            unit_id: UNIT1_ID,
            lesson_id: LESSON_COMPLETED,
            title: "Slides".to_string(),
            resource_type: ResourceType::Document,
            url: Some("https://files.example.com/slides.pdf".to_string()),
        },
        Resource {
            id: RESOURCE_SUBMITTED,
            unit_id: UNIT2_ID,
            lesson_id: LESSON_U2,
            title: "Project Brief".to_string(),
            resource_type: ResourceType::Assignment,
            url: None,
        },
    ];

    FixtureRepo {
        students: vec![student, outsider],
        groups: vec![
            Group {
                id: GROUP_ID,
                group_code: "G1".to_string(),
            },
            Group {
                id: OUTSIDER_GROUP_ID,
                group_code: "G2".to_string(),
            },
        ],
        courses: vec![Course {
            id: COURSE_ID,
            course_code: "CS101".to_string(),
            title: "Computer Science".to_string(),
            course_type: "UNDERGRADUATE".to_string(),
        }],
        course: Some(course),
        course_groups: vec![GROUP_ID],
        progress,
        resources,
        submissions: vec![(RESOURCE_SUBMITTED, STUDENT_ID)],
        created: Mutex::new(Vec::new()),
        fail: false,
    }
}

/// Builds the real router around a fixture repo with the default (Local)
/// test configuration, so the `x-student-id` bypass can authenticate requests.
pub fn app(repo: FixtureRepo) -> axum::Router {
    let state = AppState {
        repo: Arc::new(repo),
        config: AppConfig::default(),
    };
    create_router(state)
}
