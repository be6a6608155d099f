//! # Booking Ledger
//!
//! The rules that decide whether a slot can be opened, closed, booked,
//! annotated or deleted. The ledger owns no data: every operation re-reads what
//! it needs from the injected [`BookingStore`] and either returns a result or a
//! classified [`BookingError`].
//!
//! ## Races
//!
//! `toggle_or_create_slot` and `book_slot` are check-then-act. Two things keep
//! them consistent when callers overlap:
//!
//! - the writes they end with are conditional at the store (see
//!   [`crate::store`]), so a stale check can never overwrite a newer state;
//! - the ledger serialises toggles per natural key and bookings per student
//!   number, so the active-booking guard cannot be passed twice by the same
//!   student.
//!
//! ## Timeouts
//!
//! Each store round-trip is bounded by the ledger's timeout. Dropping an
//! operation's future abandons it; single-record writes are atomic at the store,
//! and the one two-write sequence (student upsert, then slot claim) reports a
//! failure of its second step as [`BookingError::PartialFailure`].

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

use crate::calendar::{CalendarEvent, CalendarSettings};
use crate::errors::{BookingError, BookingResult};
use crate::messages;
use crate::models::slot::{
    Appointment, AppointmentOutcome, NaturalKey, NewSlot, Slot, SlotId, SlotQuery,
};
use crate::models::student::{BookingRequest, Student, StudentInfo, StudentNumber};
use crate::models::teacher::Teacher;
use crate::store::{BookingStore, StoreError, StoreResult};
use crate::validation;

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of [`BookingLedger::toggle_or_create_slot`].
#[derive(Debug, Clone, PartialEq)]
pub struct SlotChange {
    pub slot: Slot,
    pub created: bool,
}

impl SlotChange {
    pub fn message(&self) -> String {
        if self.created {
            messages::SLOT_CREATED.to_string()
        } else {
            messages::slot_toggled(self.slot.available)
        }
    }
}

/// Per-key async locks. Entries nobody holds are pruned on the next lock.
#[derive(Debug, Default)]
struct KeyedLocks {
    entries: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    async fn lock(&self, key: String) -> OwnedMutexGuard<()> {
        let entry = {
            let mut entries = self.entries.lock().await;
            entries.retain(|_, lock| Arc::strong_count(lock) > 1);
            entries.entry(key).or_default().clone()
        };
        entry.lock_owned().await
    }
}

#[derive(Clone)]
pub struct BookingLedger {
    store: Arc<dyn BookingStore>,
    locks: Arc<KeyedLocks>,
    timeout: Duration,
}

impl BookingLedger {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self {
            store,
            locks: Arc::default(),
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// A handle sharing this ledger's store and locks but bounding each store
    /// round-trip by `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn list_available_slots(&self, teacher: Teacher) -> BookingResult<Vec<Slot>> {
        let query = SlotQuery::for_teacher(teacher).available(true);
        self.call("list_slots", self.store.list_slots(&query)).await
    }

    /// Booked, unavailable slots of `teacher` joined with their students.
    ///
    /// A slot whose student number has no student record is still listed,
    /// with `student` left empty.
    pub async fn list_appointments(&self, teacher: Teacher) -> BookingResult<Vec<Appointment>> {
        let query = SlotQuery::for_teacher(teacher).available(false).booked(true);
        let slots = self.call("list_slots", self.store.list_slots(&query)).await?;

        let mut numbers: Vec<StudentNumber> = slots
            .iter()
            .filter_map(|slot| slot.student_number.clone())
            .collect();
        numbers.sort();
        numbers.dedup();

        let students = if numbers.is_empty() {
            Vec::new()
        } else {
            self.call("find_students", self.store.find_students(&numbers))
                .await?
        };
        let by_number: HashMap<&StudentNumber, &Student> = students
            .iter()
            .map(|student| (&student.student_number, student))
            .collect();

        let appointments = slots
            .into_iter()
            .map(|slot| {
                let student = slot
                    .student_number
                    .as_ref()
                    .and_then(|number| by_number.get(number))
                    .map(|student| StudentInfo::from(*student));
                if student.is_none() {
                    warn!(
                        slot_id = slot.id,
                        student_number = ?slot.student_number,
                        "Appointment refers to an unknown student; omitting student details"
                    );
                }
                Appointment { slot, student }
            })
            .collect();

        Ok(appointments)
    }

    pub async fn list_slots_for_date(
        &self,
        date: NaiveDate,
        teacher: Teacher,
    ) -> BookingResult<Vec<Slot>> {
        let query = SlotQuery::for_teacher(teacher).on_date(date);
        self.call("list_slots", self.store.list_slots(&query)).await
    }

    /// Opens a time that has no slot yet, or flips the availability of an
    /// unbooked one. Booked slots are refused.
    pub async fn toggle_or_create_slot(&self, key: NaturalKey) -> BookingResult<SlotChange> {
        let _guard = self.locks.lock(format!("slot:{key}")).await;

        let existing = self
            .call("find_slot_by_key", self.store.find_slot_by_key(&key))
            .await?;

        match existing {
            Some(slot) if slot.is_booked() => {
                warn!(slot_id = slot.id, %key, "Refusing to toggle a booked slot");
                Err(BookingError::Conflict(messages::BOOKED_SLOT_LOCKED.to_string()))
            }
            Some(slot) => {
                let updated = self
                    .call(
                        "set_availability",
                        self.store
                            .set_availability(slot.id, slot.available, !slot.available),
                    )
                    .await?
                    .ok_or_else(|| {
                        warn!(slot_id = slot.id, %key, "Slot changed between read and toggle");
                        BookingError::Conflict(messages::SLOT_CHANGED_CONCURRENTLY.to_string())
                    })?;
                info!(slot_id = updated.id, %key, available = updated.available, "Toggled slot");
                Ok(SlotChange {
                    slot: updated,
                    created: false,
                })
            }
            None => {
                let created = match tokio::time::timeout(
                    self.timeout,
                    self.store.insert_slot(&NewSlot::open(key)),
                )
                .await
                {
                    Ok(Err(StoreError::UniqueViolation(detail))) => {
                        warn!(%key, %detail, "Slot was created concurrently");
                        return Err(BookingError::Conflict(
                            messages::SLOT_CHANGED_CONCURRENTLY.to_string(),
                        ));
                    }
                    other => self.settle("insert_slot", other)?,
                };
                info!(slot_id = created.id, %key, "Created open slot");
                Ok(SlotChange {
                    slot: created,
                    created: true,
                })
            }
        }
    }

    /// Books `slot_id` for the student in `request`.
    ///
    /// Guards run in a fixed order: a student with an uncompleted booking is
    /// refused before the target slot is even looked at.
    ///
    /// The student record is upserted before the slot is claimed and is not
    /// rolled back when the claim loses a race, so the last submitted name,
    /// class and topic win even on a `Conflict`.
    pub async fn book_slot(&self, slot_id: SlotId, request: BookingRequest) -> BookingResult<Slot> {
        validation::validate_request(&request)?;
        let student_number = request.student_number.clone();

        let _guard = self.locks.lock(format!("student:{student_number}")).await;

        let active_query = SlotQuery::for_student(student_number.clone()).completed(false);
        let active = self
            .call("list_slots", self.store.list_slots(&active_query))
            .await?;
        if let Some(existing) = active.iter().find(|slot| slot.is_active_booking()) {
            warn!(
                %student_number,
                existing_slot_id = existing.id,
                requested_slot_id = slot_id,
                "Student already has an active booking"
            );
            return Err(BookingError::Conflict(
                messages::ACTIVE_BOOKING_EXISTS.to_string(),
            ));
        }

        let slot = self.call("find_slot", self.store.find_slot(slot_id)).await?;
        match slot {
            Some(slot) if slot.available && !slot.is_booked() => {}
            _ => {
                warn!(slot_id, %student_number, "Requested slot is not available");
                return Err(BookingError::Conflict(messages::SLOT_UNAVAILABLE.to_string()));
            }
        }

        let student = self
            .call("upsert_student", self.store.upsert_student(&request.into()))
            .await?;
        debug!(student_id = student.id, %student_number, "Upserted student");

        match self
            .call(
                "assign_student",
                self.store.assign_student(slot_id, &student_number),
            )
            .await
        {
            Ok(Some(booked)) => {
                info!(slot_id, %student_number, "Booked slot");
                Ok(booked)
            }
            Ok(None) => {
                // The upsert above already replaced name, class and topic.
                warn!(
                    slot_id,
                    %student_number,
                    student_written = true,
                    "Slot was claimed concurrently after the student record was saved"
                );
                Err(BookingError::Conflict(messages::SLOT_UNAVAILABLE.to_string()))
            }
            Err(err) => {
                error!(
                    slot_id,
                    %student_number,
                    error = %err,
                    "Student saved but slot could not be claimed"
                );
                Err(BookingError::PartialFailure {
                    slot_id,
                    student_number,
                    source: Box::new(err),
                })
            }
        }
    }

    /// Single slot lookup, `None` when the id is unknown.
    pub async fn find_slot(&self, slot_id: SlotId) -> BookingResult<Option<Slot>> {
        self.call("find_slot", self.store.find_slot(slot_id)).await
    }

    /// Records attendance, notes and completion. Completing an appointment
    /// does not reopen the slot; it only lifts the student's active-booking
    /// guard.
    pub async fn update_appointment(
        &self,
        slot_id: SlotId,
        outcome: AppointmentOutcome,
    ) -> BookingResult<Slot> {
        let updated = self
            .call(
                "update_outcome",
                self.store.update_outcome(slot_id, &outcome),
            )
            .await?
            .ok_or_else(|| BookingError::NotFound(messages::APPOINTMENT_NOT_FOUND.to_string()))?;
        info!(
            slot_id,
            present = updated.present,
            completed = updated.completed,
            "Updated appointment"
        );
        Ok(updated)
    }

    pub async fn delete_slot(&self, slot_id: SlotId) -> BookingResult<()> {
        let slot = self
            .call("find_slot", self.store.find_slot(slot_id))
            .await?
            .ok_or_else(|| BookingError::NotFound(messages::SLOT_NOT_FOUND.to_string()))?;
        if slot.is_booked() {
            warn!(slot_id, "Refusing to delete a booked slot");
            return Err(BookingError::Conflict(
                messages::BOOKED_SLOT_UNDELETABLE.to_string(),
            ));
        }

        let _guard = self.locks.lock(format!("slot:{}", slot.natural_key())).await;
        let removed = self
            .call(
                "delete_unbooked_slot",
                self.store.delete_unbooked_slot(slot_id),
            )
            .await?;
        if !removed {
            warn!(slot_id, "Slot changed between read and delete");
            return Err(BookingError::Conflict(
                messages::SLOT_CHANGED_CONCURRENTLY.to_string(),
            ));
        }
        info!(slot_id, "Deleted slot");
        Ok(())
    }

    /// iCalendar document for the appointment booked on `slot_id`.
    pub async fn appointment_calendar(
        &self,
        slot_id: SlotId,
        settings: &CalendarSettings,
    ) -> BookingResult<String> {
        let slot = self
            .call("find_slot", self.store.find_slot(slot_id))
            .await?
            .ok_or_else(|| BookingError::NotFound(messages::SLOT_NOT_FOUND.to_string()))?;
        if !slot.is_booked() {
            return Err(BookingError::Conflict(messages::SLOT_NOT_BOOKED.to_string()));
        }
        let event = CalendarEvent::for_slot(&slot, settings, Utc::now())?;
        Ok(event.to_ics())
    }

    async fn call<T, F>(&self, operation: &'static str, fut: F) -> BookingResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let outcome = tokio::time::timeout(self.timeout, fut).await;
        self.settle(operation, outcome)
    }

    fn settle<T>(
        &self,
        operation: &'static str,
        outcome: Result<StoreResult<T>, tokio::time::error::Elapsed>,
    ) -> BookingResult<T> {
        match outcome {
            Ok(Ok(value)) => {
                debug!(operation, "Store call succeeded");
                Ok(value)
            }
            Ok(Err(StoreError::UniqueViolation(detail))) => {
                warn!(operation, %detail, "Store rejected a duplicate");
                Err(BookingError::Conflict(messages::GENERIC_FAILURE.to_string()))
            }
            Ok(Err(StoreError::Unavailable(detail))) => {
                error!(operation, %detail, "Store unavailable");
                Err(BookingError::Unavailable(detail))
            }
            Ok(Err(StoreError::Backend(report))) => {
                error!(operation, error = ?report, "Store call failed");
                Err(BookingError::OperationFailed(report))
            }
            Err(_) => {
                error!(operation, timeout = ?self.timeout, "Store call timed out");
                Err(BookingError::Timeout(format!(
                    "{operation} did not complete within {:?}",
                    self.timeout
                )))
            }
        }
    }
}
