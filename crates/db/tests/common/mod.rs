#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use fake::Fake;
use fake::faker::name::en::Name;
use sectorplan_core::ledger::BookingLedger;
use sectorplan_core::models::slot::{NaturalKey, Slot, SlotTime};
use sectorplan_core::models::student::{BookingRequest, StudentClass};
use sectorplan_core::models::teacher::Teacher;
use sectorplan_db::MemoryBookingStore;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn key(day: u32, time: &str, teacher: Teacher) -> NaturalKey {
    NaturalKey::new(date(2024, 3, day), time.parse::<SlotTime>().unwrap(), teacher)
}

pub fn request(student_number: &str) -> BookingRequest {
    BookingRequest {
        name: Name().fake(),
        class: StudentClass::Gt1,
        student_number: student_number.parse().unwrap(),
        topic: "Zonnepanelen op het schooldak".to_string(),
    }
}

pub fn memory_ledger() -> (MemoryBookingStore, BookingLedger) {
    let store = MemoryBookingStore::new();
    let ledger = BookingLedger::new(Arc::new(store.clone()));
    (store, ledger)
}

pub fn open_slot(id: i64) -> Slot {
    Slot {
        id,
        date: date(2024, 3, 10),
        time: "10:00".parse().unwrap(),
        teacher: Teacher::Daemen,
        available: true,
        student_number: None,
        present: false,
        notes: None,
        completed: false,
        created_at: Utc::now(),
    }
}
