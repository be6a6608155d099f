//! Persistence port for the booking ledger.
//!
//! Adapters live in `sectorplan-db`. Every write that the ledger relies on for
//! a race-free check-then-act is conditional: it only applies when the stored
//! record is still in the state the ledger read, and reports `None`/`false`
//! otherwise.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::slot::{AppointmentOutcome, NaturalKey, NewSlot, Slot, SlotId, SlotQuery};
use crate::models::student::{NewStudent, Student, StudentNumber};

#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (duplicate natural key).
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Backend(#[from] eyre::Report),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Slots matching `query`, ordered by date, time and id.
    async fn list_slots(&self, query: &SlotQuery) -> StoreResult<Vec<Slot>>;

    async fn find_slot(&self, id: SlotId) -> StoreResult<Option<Slot>>;

    async fn find_slot_by_key(&self, key: &NaturalKey) -> StoreResult<Option<Slot>>;

    /// Fails with [`StoreError::UniqueViolation`] when the key is taken.
    async fn insert_slot(&self, slot: &NewSlot) -> StoreResult<Slot>;

    /// Sets `available` only if the slot is unbooked and its availability still
    /// equals `expected`.
    async fn set_availability(
        &self,
        id: SlotId,
        expected: bool,
        available: bool,
    ) -> StoreResult<Option<Slot>>;

    /// Books the slot for `student_number` only if it is available and unbooked.
    async fn assign_student(
        &self,
        id: SlotId,
        student_number: &StudentNumber,
    ) -> StoreResult<Option<Slot>>;

    /// Overwrites present/notes/completed. `None` when the slot does not exist.
    async fn update_outcome(
        &self,
        id: SlotId,
        outcome: &AppointmentOutcome,
    ) -> StoreResult<Option<Slot>>;

    /// Removes the slot only if it is unbooked. Returns whether a row went away.
    async fn delete_unbooked_slot(&self, id: SlotId) -> StoreResult<bool>;

    async fn find_students(&self, numbers: &[StudentNumber]) -> StoreResult<Vec<Student>>;

    /// Inserts, or overwrites name/class/topic of the student with this number.
    async fn upsert_student(&self, student: &NewStudent) -> StoreResult<Student>;
}
