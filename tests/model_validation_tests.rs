use chrono::{TimeZone, Utc};
use student_portal::models::{
    DashboardView, LessonStatus, LessonSummary, ProgressOverview, RegisterStudentRequest,
    Resource, ResourceType, Student, StudentStatus, StudentSummary, UnitProgressRow,
};
use uuid::Uuid;

// The JSON produced here is a frontend contract: the keys below are consumed
// verbatim by the client, so every rename and skip attribute is asserted.

#[test]
fn dashboard_view_uses_the_contract_key_names() {
    let view = DashboardView {
        student: StudentSummary {
            id: Uuid::from_u128(0x10),
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            group: "G1".to_string(),
            course: "CS101".to_string(),
            student_type: "FULL_TIME".to_string(),
            status: StudentStatus::Active,
        },
        progress: ProgressOverview {
            overall: 50.0,
            by_unit: vec![UnitProgressRow {
                unit_id: Uuid::from_u128(0x40),
                unit_code: "CS101-U1".to_string(),
                unit_name: "Foundations".to_string(),
                completion: 100.0,
            }],
        },
        assignments: Default::default(),
    };

    let json = serde_json::to_string(&view).unwrap();

    assert!(json.contains(r#""fullName":"Ada Lovelace""#));
    assert!(json.contains(r#""type":"FULL_TIME""#));
    assert!(json.contains(r#""status":"ACTIVE""#));
    assert!(json.contains(r#""byUnit":[{"#));
    assert!(json.contains(r#""unitId""#));
    assert!(json.contains(r#""unitCode":"CS101-U1""#));
    assert!(json.contains(r#""unitName":"Foundations""#));
    // No snake_case leakage anywhere in the payload.
    assert!(!json.contains("full_name"));
    assert!(!json.contains("by_unit"));
    assert!(!json.contains("student_type"));
}

#[test]
fn lesson_status_serializes_screaming_snake_case() {
    assert_eq!(
        serde_json::to_string(&LessonStatus::NotStarted).unwrap(),
        r#""NOT_STARTED""#
    );
    assert_eq!(
        serde_json::to_string(&LessonStatus::InProgress).unwrap(),
        r#""IN_PROGRESS""#
    );
    assert_eq!(
        serde_json::to_string(&LessonStatus::Completed).unwrap(),
        r#""COMPLETED""#
    );
}

#[test]
fn lesson_summary_omits_completed_at_when_absent() {
    let mut lesson = LessonSummary {
        id: Uuid::from_u128(0x50),
        title: "Variables".to_string(),
        order: 1,
        status: LessonStatus::NotStarted,
        completed_at: None,
    };

    let json = serde_json::to_string(&lesson).unwrap();
    assert!(!json.contains("completedAt"));

    lesson.completed_at = Some(Utc.with_ymd_and_hms(2025, 10, 5, 12, 0, 0).unwrap());
    let json = serde_json::to_string(&lesson).unwrap();
    assert!(json.contains(r#""completedAt""#));
}

#[test]
fn student_never_serializes_its_password_hash() {
    let student = Student {
        password_hash: "argon2-secret-material".to_string(),
        ..Default::default()
    };

    let json = serde_json::to_string(&student).unwrap();
    assert!(!json.contains("argon2-secret-material"));
    assert!(!json.contains("passwordHash"));
}

#[test]
fn resource_type_field_round_trips_as_type() {
    let resource = Resource {
        id: Uuid::from_u128(0x60),
        unit_id: Uuid::from_u128(0x40),
        lesson_id: Uuid::from_u128(0x50),
        title: "Worksheet".to_string(),
        resource_type: ResourceType::Assignment,
        url: None,
    };

    let json = serde_json::to_string(&resource).unwrap();
    assert!(json.contains(r#""type":"ASSIGNMENT""#));
    assert!(!json.contains("resource_type"));

    let back: Resource = serde_json::from_str(&json).unwrap();
    assert_eq!(back.resource_type, ResourceType::Assignment);
}

#[test]
fn register_request_accepts_the_client_payload_shape() {
    let payload = r#"{
        "fullName": "Ada Lovelace",
        "email": "ada@example.com",
        "password": "pw123456",
        "groupCode": "G1",
        "courseCode": "CS101",
        "type": "FULL_TIME"
    }"#;

    let request: RegisterStudentRequest = serde_json::from_str(payload).unwrap();
    assert_eq!(request.full_name, "Ada Lovelace");
    assert_eq!(request.group_code, "G1");
    assert_eq!(request.course_code, "CS101");
    assert_eq!(request.student_type, "FULL_TIME");
}
