use chrono::{NaiveDate, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sectorplan_core::models::slot::Slot;
use sectorplan_core::models::student::{Student, StudentClass};
use sectorplan_core::models::teacher::Teacher;
use sectorplan_db::models::{DbSlot, DbStudent};

fn row() -> DbSlot {
    DbSlot {
        id: 12,
        date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        time: "10:00".to_string(),
        teacher: "Daemen".to_string(),
        available: false,
        student_number: Some("12345".to_string()),
        present: true,
        notes: Some("Goed verhaal".to_string()),
        completed: true,
        created_at: Utc::now(),
    }
}

#[test]
fn test_db_slot_converts_to_slot() {
    let row = row();
    let created_at = row.created_at;

    let slot = Slot::try_from(row).unwrap();

    assert_eq!(slot.id, 12);
    assert_eq!(slot.time.to_string(), "10:00");
    assert_eq!(slot.teacher, Teacher::Daemen);
    assert_eq!(slot.student_number.as_ref().unwrap().as_str(), "12345");
    assert_eq!(slot.notes.as_deref(), Some("Goed verhaal"));
    assert!(slot.present && slot.completed && !slot.available);
    assert_eq!(slot.created_at, created_at);
}

#[rstest]
#[case::bad_time(|r: &mut DbSlot| r.time = "25:00".to_string(), "malformed time")]
#[case::bad_teacher(|r: &mut DbSlot| r.teacher = "Jansen".to_string(), "malformed teacher")]
#[case::bad_number(|r: &mut DbSlot| r.student_number = Some("12a45".to_string()), "malformed student number")]
fn test_malformed_db_slot_is_rejected(#[case] corrupt: fn(&mut DbSlot), #[case] expected: &str) {
    let mut row = row();
    corrupt(&mut row);

    let err = Slot::try_from(row).unwrap_err();

    assert!(err.to_string().contains(expected), "{err}");
}

#[test]
fn test_db_student_converts_to_student() {
    let row = DbStudent {
        id: 3,
        student_number: "7654321".to_string(),
        name: "Noah Bakker".to_string(),
        class: "4GT2".to_string(),
        topic: "Elektrische auto's".to_string(),
        created_at: Utc::now(),
    };

    let student = Student::try_from(row).unwrap();

    assert_eq!(student.student_number.as_str(), "7654321");
    assert_eq!(student.class, StudentClass::Gt2);

    let bad = DbStudent {
        id: 4,
        student_number: "12345".to_string(),
        name: "Emma Smit".to_string(),
        class: "5VWO".to_string(),
        topic: "Kernenergie".to_string(),
        created_at: Utc::now(),
    };
    assert!(Student::try_from(bad).is_err());
}
