#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use sectorplan_api::{ApiState, build_router};
use sectorplan_core::ledger::BookingLedger;
use sectorplan_db::MemoryBookingStore;
use serde_json::{Value, json};

pub struct TestContext {
    pub store: MemoryBookingStore,
    pub server: TestServer,
}

impl TestContext {
    /// A server over a fresh in-memory store.
    pub fn new() -> Self {
        let store = MemoryBookingStore::new();
        let ledger = BookingLedger::new(Arc::new(store.clone()));
        let server = TestServer::new(build_router(Arc::new(ApiState::new(ledger))))
            .expect("test server should start");
        Self { store, server }
    }

    /// Opens `time` on 2024-03-10 for `teacher` and returns the slot id.
    pub async fn open_slot(&self, teacher: &str, time: &str) -> i64 {
        let response = self
            .server
            .post(&format!("/api/teachers/{teacher}/slots/toggle"))
            .add_header(identity_header(), signed_in(teacher))
            .json(&json!({ "date": "2024-03-10", "time": time }))
            .await;
        let body: Value = response.json();
        body["data"]["id"].as_i64().expect("toggle should return the slot")
    }
}

pub fn identity_header() -> HeaderName {
    HeaderName::from_static("x-teacher-identity")
}

pub fn signed_in(teacher: &str) -> HeaderValue {
    HeaderValue::from_str(teacher).expect("teacher name is a valid header value")
}

pub fn booking_form(student_number: &str) -> Value {
    json!({
        "name": "Lotte Jansen",
        "class": "4GT2",
        "student_number": student_number,
        "topic": "Duurzame energie in de wijk",
    })
}
