mod common;

use std::collections::HashSet;

use common::{date, key, memory_ledger, request};
use pretty_assertions::assert_eq;
use sectorplan_core::calendar::CalendarSettings;
use sectorplan_core::errors::{BookingError, ErrorKind};
use sectorplan_core::messages;
use sectorplan_core::models::slot::AppointmentOutcome;
use sectorplan_core::models::teacher::Teacher;
use sectorplan_core::store::BookingStore;

#[test_log::test(tokio::test)]
async fn test_toggle_creates_then_closes() {
    let (_, ledger) = memory_ledger();
    let key = key(10, "10:00", Teacher::Daemen);

    let first = ledger.toggle_or_create_slot(key).await.unwrap();
    assert!(first.created);
    assert!(first.slot.available);
    assert_eq!(first.slot.student_number, None);
    assert!(!first.slot.present);
    assert!(!first.slot.completed);
    assert_eq!(first.slot.notes, None);
    assert_eq!(first.message(), messages::SLOT_CREATED);

    let second = ledger.toggle_or_create_slot(key).await.unwrap();
    assert!(!second.created);
    assert_eq!(second.slot.id, first.slot.id);
    assert!(!second.slot.available);
    assert_eq!(second.message(), "Tijdslot is nu gesloten.");

    let third = ledger.toggle_or_create_slot(key).await.unwrap();
    assert!(third.slot.available);
}

#[test_log::test(tokio::test)]
async fn test_natural_key_stays_unique_under_concurrent_toggles() {
    let (store, ledger) = memory_ledger();
    let key = key(11, "13:30", Teacher::Martina);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.toggle_or_create_slot(key).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let slots = ledger
        .list_slots_for_date(key.date, Teacher::Martina)
        .await
        .unwrap();
    assert_eq!(slots.len(), 1);
    // One creation followed by seven flips leaves the slot closed.
    assert!(!slots[0].available);
    assert_eq!(store.students().await.len(), 0);
}

#[test_log::test(tokio::test)]
async fn test_booking_an_open_slot() {
    let (store, ledger) = memory_ledger();
    let slot = ledger
        .toggle_or_create_slot(key(10, "10:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;

    let booked = ledger.book_slot(slot.id, request("12345")).await.unwrap();

    assert_eq!(booked.id, slot.id);
    assert!(!booked.available);
    assert_eq!(booked.student_number.unwrap().as_str(), "12345");
    assert!(!booked.completed);
    assert_eq!(store.students().await.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_second_booking_on_same_slot_is_refused() {
    let (_, ledger) = memory_ledger();
    let slot = ledger
        .toggle_or_create_slot(key(10, "10:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;
    let booked = ledger.book_slot(slot.id, request("12345")).await.unwrap();

    let err = ledger.book_slot(slot.id, request("67890")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.user_message(), messages::SLOT_UNAVAILABLE);
    let after = ledger
        .list_slots_for_date(slot.date, Teacher::Daemen)
        .await
        .unwrap();
    assert_eq!(after, vec![booked]);
}

#[test_log::test(tokio::test)]
async fn test_booking_a_closed_or_missing_slot_is_refused() {
    let (_, ledger) = memory_ledger();
    let key = key(10, "11:00", Teacher::Daemen);
    ledger.toggle_or_create_slot(key).await.unwrap();
    let closed = ledger.toggle_or_create_slot(key).await.unwrap().slot;

    let err = ledger.book_slot(closed.id, request("12345")).await.unwrap_err();
    assert_eq!(err.user_message(), messages::SLOT_UNAVAILABLE);

    let err = ledger.book_slot(999, request("12345")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test_log::test(tokio::test)]
async fn test_active_booking_guard_wins_over_free_slot() {
    let (store, ledger) = memory_ledger();
    let first = ledger
        .toggle_or_create_slot(key(10, "10:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;
    let second = ledger
        .toggle_or_create_slot(key(10, "10:30", Teacher::Martina))
        .await
        .unwrap()
        .slot;
    let original = request("12345");
    ledger.book_slot(first.id, original.clone()).await.unwrap();

    let mut renamed = request("12345");
    renamed.name = "Iemand Anders".to_string();
    let err = ledger.book_slot(second.id, renamed).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.user_message(), messages::ACTIVE_BOOKING_EXISTS);
    let untouched = store.find_slot(second.id).await.unwrap().unwrap();
    assert!(untouched.available);
    assert_eq!(untouched.student_number, None);
    let students = store.students().await;
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].name, original.name);
}

#[test_log::test(tokio::test)]
async fn test_active_booking_guard_checks_before_availability() {
    let (_, ledger) = memory_ledger();
    let slot = ledger
        .toggle_or_create_slot(key(10, "10:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;
    ledger.book_slot(slot.id, request("12345")).await.unwrap();

    // Target is unavailable too, but the student's own booking is reported.
    let err = ledger.book_slot(slot.id, request("12345")).await.unwrap_err();
    assert_eq!(err.user_message(), messages::ACTIVE_BOOKING_EXISTS);
}

#[test_log::test(tokio::test)]
async fn test_concurrent_bookings_by_one_student_book_once() {
    let (store, ledger) = memory_ledger();
    let mut slot_ids = Vec::new();
    for time in ["09:00", "09:30", "10:00", "10:30"] {
        let slot = ledger
            .toggle_or_create_slot(key(12, time, Teacher::Daemen))
            .await
            .unwrap()
            .slot;
        slot_ids.push(slot.id);
    }

    let handles: Vec<_> = slot_ids
        .iter()
        .map(|&id| {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.book_slot(id, request("24680")).await })
        })
        .collect();
    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(BookingError::Conflict(msg)) => assert_eq!(msg, messages::ACTIVE_BOOKING_EXISTS),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(successes, 1);
    let booked: Vec<_> = ledger
        .list_slots_for_date(date(2024, 3, 12), Teacher::Daemen)
        .await
        .unwrap()
        .into_iter()
        .filter(|slot| slot.is_booked())
        .collect();
    assert_eq!(booked.len(), 1);
    assert_eq!(store.students().await.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_concurrent_bookings_of_one_slot_book_once() {
    let (_, ledger) = memory_ledger();
    let slot = ledger
        .toggle_or_create_slot(key(13, "14:00", Teacher::Martina))
        .await
        .unwrap()
        .slot;

    let handles: Vec<_> = ["11111", "22222", "33333", "44444"]
        .into_iter()
        .map(|number| {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.book_slot(slot.id, request(number)).await })
        })
        .collect();
    let mut winners = HashSet::new();
    for handle in handles {
        if let Ok(booked) = handle.await.unwrap() {
            winners.insert(booked.student_number.unwrap());
        }
    }

    assert_eq!(winners.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_booked_slot_cannot_be_toggled() {
    let (_, ledger) = memory_ledger();
    let key = key(10, "10:00", Teacher::Daemen);
    let slot = ledger.toggle_or_create_slot(key).await.unwrap().slot;
    let booked = ledger.book_slot(slot.id, request("12345")).await.unwrap();

    let err = ledger.toggle_or_create_slot(key).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.user_message(), messages::BOOKED_SLOT_LOCKED);
    let after = ledger
        .list_slots_for_date(key.date, Teacher::Daemen)
        .await
        .unwrap();
    assert_eq!(after, vec![booked]);
}

#[test_log::test(tokio::test)]
async fn test_completed_booking_stays_retired() {
    let (_, ledger) = memory_ledger();
    let key = key(10, "10:00", Teacher::Daemen);
    let slot = ledger.toggle_or_create_slot(key).await.unwrap().slot;
    ledger.book_slot(slot.id, request("12345")).await.unwrap();
    ledger
        .update_appointment(
            slot.id,
            AppointmentOutcome {
                present: true,
                notes: None,
                completed: true,
            },
        )
        .await
        .unwrap();

    let err = ledger.toggle_or_create_slot(key).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(ledger.list_available_slots(Teacher::Daemen).await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_completing_an_appointment_allows_a_new_booking() {
    let (_, ledger) = memory_ledger();
    let first = ledger
        .toggle_or_create_slot(key(10, "10:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;
    let second = ledger
        .toggle_or_create_slot(key(17, "10:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;
    ledger.book_slot(first.id, request("12345")).await.unwrap();

    let err = ledger.book_slot(second.id, request("12345")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    ledger
        .update_appointment(
            first.id,
            AppointmentOutcome {
                present: false,
                notes: Some("Niet komen opdagen".to_string()),
                completed: true,
            },
        )
        .await
        .unwrap();

    let rebooked = ledger.book_slot(second.id, request("12345")).await.unwrap();
    assert_eq!(rebooked.student_number.unwrap().as_str(), "12345");
}

#[test_log::test(tokio::test)]
async fn test_update_appointment_overwrites_fields() {
    let (_, ledger) = memory_ledger();
    let slot = ledger
        .toggle_or_create_slot(key(10, "10:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;

    // Unbooked slots are not rejected.
    let updated = ledger
        .update_appointment(
            slot.id,
            AppointmentOutcome {
                present: true,
                notes: Some("Voorbereid".to_string()),
                completed: false,
            },
        )
        .await
        .unwrap();
    assert!(updated.present);
    assert_eq!(updated.notes.as_deref(), Some("Voorbereid"));
    assert!(updated.available);

    let cleared = ledger
        .update_appointment(
            slot.id,
            AppointmentOutcome {
                present: false,
                notes: None,
                completed: false,
            },
        )
        .await
        .unwrap();
    assert!(!cleared.present);
    assert_eq!(cleared.notes, None);
}

#[test_log::test(tokio::test)]
async fn test_update_unknown_appointment_is_not_found() {
    let (_, ledger) = memory_ledger();

    let err = ledger
        .update_appointment(
            42,
            AppointmentOutcome {
                present: true,
                notes: None,
                completed: true,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.user_message(), messages::APPOINTMENT_NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_delete_slot_rules() {
    let (store, ledger) = memory_ledger();
    let open = ledger
        .toggle_or_create_slot(key(10, "09:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;
    let taken = ledger
        .toggle_or_create_slot(key(10, "09:30", Teacher::Daemen))
        .await
        .unwrap()
        .slot;
    let booked = ledger.book_slot(taken.id, request("12345")).await.unwrap();

    let err = ledger.delete_slot(booked.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.user_message(), messages::BOOKED_SLOT_UNDELETABLE);
    assert_eq!(store.find_slot(booked.id).await.unwrap(), Some(booked.clone()));

    ledger.delete_slot(open.id).await.unwrap();
    let remaining = ledger
        .list_slots_for_date(open.date, Teacher::Daemen)
        .await
        .unwrap();
    assert_eq!(remaining, vec![booked]);
    assert_eq!(store.students().await.len(), 1);

    let err = ledger.delete_slot(open.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test_log::test(tokio::test)]
async fn test_deleted_key_can_be_reopened() {
    let (_, ledger) = memory_ledger();
    let key = key(10, "15:00", Teacher::Martina);
    let slot = ledger.toggle_or_create_slot(key).await.unwrap().slot;
    ledger.delete_slot(slot.id).await.unwrap();

    let reopened = ledger.toggle_or_create_slot(key).await.unwrap();
    assert!(reopened.created);
    assert_ne!(reopened.slot.id, slot.id);
}

#[test_log::test(tokio::test)]
async fn test_listing_filters_by_teacher_and_availability() {
    let (_, ledger) = memory_ledger();
    let daemen_open = ledger
        .toggle_or_create_slot(key(10, "09:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;
    let daemen_closed_key = key(10, "09:30", Teacher::Daemen);
    ledger.toggle_or_create_slot(daemen_closed_key).await.unwrap();
    ledger.toggle_or_create_slot(daemen_closed_key).await.unwrap();
    ledger
        .toggle_or_create_slot(key(10, "09:00", Teacher::Martina))
        .await
        .unwrap();
    ledger
        .toggle_or_create_slot(key(11, "09:00", Teacher::Daemen))
        .await
        .unwrap();

    let available = ledger.list_available_slots(Teacher::Daemen).await.unwrap();
    assert_eq!(available.len(), 2);
    assert!(available.iter().all(|s| s.teacher == Teacher::Daemen && s.available));
    assert_eq!(available[0].id, daemen_open.id);

    let on_date = ledger
        .list_slots_for_date(date(2024, 3, 10), Teacher::Daemen)
        .await
        .unwrap();
    let times: Vec<String> = on_date.iter().map(|s| s.time.to_string()).collect();
    assert_eq!(times, vec!["09:00", "09:30"]);
}

#[test_log::test(tokio::test)]
async fn test_appointments_join_student_details() {
    let (_, ledger) = memory_ledger();
    let slot = ledger
        .toggle_or_create_slot(key(10, "10:00", Teacher::Martina))
        .await
        .unwrap()
        .slot;
    ledger
        .toggle_or_create_slot(key(10, "10:30", Teacher::Martina))
        .await
        .unwrap();
    let mut booking = request("54321");
    booking.topic = "Stikstof en de boeren".to_string();
    ledger.book_slot(slot.id, booking.clone()).await.unwrap();

    let appointments = ledger.list_appointments(Teacher::Martina).await.unwrap();

    assert_eq!(appointments.len(), 1);
    let student = appointments[0].student.as_ref().unwrap();
    assert_eq!(student.name, booking.name);
    assert_eq!(student.topic, "Stikstof en de boeren");
    assert!(ledger.list_appointments(Teacher::Daemen).await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_rebooking_updates_the_same_student() {
    let (store, ledger) = memory_ledger();
    let first = ledger
        .toggle_or_create_slot(key(10, "10:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;
    let second = ledger
        .toggle_or_create_slot(key(17, "10:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;
    ledger.book_slot(first.id, request("12345")).await.unwrap();
    ledger
        .update_appointment(
            first.id,
            AppointmentOutcome {
                present: true,
                notes: None,
                completed: true,
            },
        )
        .await
        .unwrap();

    let mut again = request("12345");
    again.topic = "Een nieuw onderwerp".to_string();
    ledger.book_slot(second.id, again).await.unwrap();

    let students = store.students().await;
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].topic, "Een nieuw onderwerp");
}

#[test_log::test(tokio::test)]
async fn test_presentation_day_scenario() {
    let (_, ledger) = memory_ledger();

    let opened = ledger
        .toggle_or_create_slot(key(10, "10:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;
    assert!(opened.available);

    let booked = ledger.book_slot(opened.id, request("12345")).await.unwrap();
    assert!(!booked.available);
    assert_eq!(booked.student_number.as_ref().unwrap().as_str(), "12345");

    let closed = ledger
        .update_appointment(
            opened.id,
            AppointmentOutcome {
                present: true,
                notes: Some("Good talk".to_string()),
                completed: true,
            },
        )
        .await
        .unwrap();
    assert!(closed.present);
    assert_eq!(closed.notes.as_deref(), Some("Good talk"));
    assert!(closed.completed);

    let next = ledger
        .toggle_or_create_slot(key(17, "11:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;
    let rebooked = ledger.book_slot(next.id, request("12345")).await.unwrap();
    assert_eq!(rebooked.id, next.id);
    assert!(!rebooked.available);
}

#[test_log::test(tokio::test)]
async fn test_invalid_request_never_reaches_the_store() {
    let (store, ledger) = memory_ledger();
    let slot = ledger
        .toggle_or_create_slot(key(10, "10:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;
    let mut bad = request("12345");
    bad.name = " ".to_string();

    let err = ledger.book_slot(slot.id, bad).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(store.students().await.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_calendar_export_requires_booking() {
    let (_, ledger) = memory_ledger();
    let settings = CalendarSettings::default();
    let slot = ledger
        .toggle_or_create_slot(key(10, "10:00", Teacher::Daemen))
        .await
        .unwrap()
        .slot;

    let err = ledger.appointment_calendar(slot.id, &settings).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    ledger.book_slot(slot.id, request("12345")).await.unwrap();
    let ics = ledger.appointment_calendar(slot.id, &settings).await.unwrap();
    assert!(ics.contains("DTSTART:20240310T090000Z"));

    let err = ledger.appointment_calendar(404, &settings).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
