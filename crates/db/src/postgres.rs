use async_trait::async_trait;
use eyre::Report;
use sectorplan_core::models::slot::{
    AppointmentOutcome, NaturalKey, NewSlot, Slot, SlotId, SlotQuery,
};
use sectorplan_core::models::student::{NewStudent, Student, StudentNumber};
use sectorplan_core::store::{BookingStore, StoreError, StoreResult};
use tracing::debug;

use crate::DbPool;
use crate::repositories::{slot as slot_repo, student as student_repo};

/// [`BookingStore`] backed by PostgreSQL.
///
/// Conditional writes are single `UPDATE ... WHERE` / `DELETE ... WHERE`
/// statements, and the natural key is a table constraint, so every port
/// guarantee holds across processes sharing the database.
#[derive(Debug, Clone)]
pub struct PgBookingStore {
    pool: DbPool,
}

impl PgBookingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Sorts a failed query into the port's error classes by looking at the
/// underlying sqlx error.
fn classify(report: Report) -> StoreError {
    let classified = match report.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Some(StoreError::UniqueViolation(db.message().to_string()))
        }
        Some(
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_),
        ) => Some(StoreError::Unavailable(report.to_string())),
        _ => None,
    };
    classified.unwrap_or_else(|| StoreError::Backend(report))
}

fn to_slot(row: crate::models::DbSlot) -> StoreResult<Slot> {
    Slot::try_from(row).map_err(StoreError::Backend)
}

fn to_slots(rows: Vec<crate::models::DbSlot>) -> StoreResult<Vec<Slot>> {
    rows.into_iter().map(to_slot).collect()
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn list_slots(&self, query: &SlotQuery) -> StoreResult<Vec<Slot>> {
        let rows = slot_repo::list_slots(&self.pool, query)
            .await
            .map_err(classify)?;
        debug!(count = rows.len(), ?query, "Listed slots");
        to_slots(rows)
    }

    async fn find_slot(&self, id: SlotId) -> StoreResult<Option<Slot>> {
        slot_repo::get_slot_by_id(&self.pool, id)
            .await
            .map_err(classify)?
            .map(to_slot)
            .transpose()
    }

    async fn find_slot_by_key(&self, key: &NaturalKey) -> StoreResult<Option<Slot>> {
        slot_repo::get_slot_by_key(
            &self.pool,
            key.date,
            &key.time.to_string(),
            key.teacher.as_str(),
        )
        .await
        .map_err(classify)?
        .map(to_slot)
        .transpose()
    }

    async fn insert_slot(&self, slot: &NewSlot) -> StoreResult<Slot> {
        let row = slot_repo::create_slot(
            &self.pool,
            slot.key.date,
            &slot.key.time.to_string(),
            slot.key.teacher.as_str(),
            slot.available,
        )
        .await
        .map_err(classify)?;
        to_slot(row)
    }

    async fn set_availability(
        &self,
        id: SlotId,
        expected: bool,
        available: bool,
    ) -> StoreResult<Option<Slot>> {
        slot_repo::set_slot_availability(&self.pool, id, expected, available)
            .await
            .map_err(classify)?
            .map(to_slot)
            .transpose()
    }

    async fn assign_student(
        &self,
        id: SlotId,
        student_number: &StudentNumber,
    ) -> StoreResult<Option<Slot>> {
        slot_repo::assign_student(&self.pool, id, student_number.as_str())
            .await
            .map_err(classify)?
            .map(to_slot)
            .transpose()
    }

    async fn update_outcome(
        &self,
        id: SlotId,
        outcome: &AppointmentOutcome,
    ) -> StoreResult<Option<Slot>> {
        slot_repo::update_outcome(
            &self.pool,
            id,
            outcome.present,
            outcome.notes.as_deref(),
            outcome.completed,
        )
        .await
        .map_err(classify)?
        .map(to_slot)
        .transpose()
    }

    async fn delete_unbooked_slot(&self, id: SlotId) -> StoreResult<bool> {
        slot_repo::delete_unbooked_slot(&self.pool, id)
            .await
            .map_err(classify)
    }

    async fn find_students(&self, numbers: &[StudentNumber]) -> StoreResult<Vec<Student>> {
        let numbers: Vec<String> = numbers.iter().map(|n| n.as_str().to_string()).collect();
        let rows = student_repo::get_students_by_numbers(&self.pool, &numbers)
            .await
            .map_err(classify)?;
        rows.into_iter()
            .map(|row| Student::try_from(row).map_err(StoreError::Backend))
            .collect()
    }

    async fn upsert_student(&self, student: &NewStudent) -> StoreResult<Student> {
        let row = student_repo::upsert_student(
            &self.pool,
            student.student_number.as_str(),
            &student.name,
            student.class.as_str(),
            &student.topic,
        )
        .await
        .map_err(classify)?;
        Student::try_from(row).map_err(StoreError::Backend)
    }
}
