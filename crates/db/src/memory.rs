use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sectorplan_core::models::slot::{
    AppointmentOutcome, NaturalKey, NewSlot, Slot, SlotId, SlotQuery,
};
use sectorplan_core::models::student::{NewStudent, Student, StudentNumber};
use sectorplan_core::store::{BookingStore, StoreError, StoreResult};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    slots: BTreeMap<SlotId, Slot>,
    slot_keys: HashMap<NaturalKey, SlotId>,
    students: HashMap<StudentNumber, Student>,
    last_slot_id: SlotId,
    last_student_id: i64,
}

/// [`BookingStore`] kept in process memory.
///
/// All writes happen under one lock, so each port call is atomic. Cloning
/// shares the underlying tables; data is lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookingStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every student, ordered by id.
    pub async fn students(&self) -> Vec<Student> {
        let tables = self.tables.read().await;
        let mut students: Vec<Student> = tables.students.values().cloned().collect();
        students.sort_by_key(|student| student.id);
        students
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn list_slots(&self, query: &SlotQuery) -> StoreResult<Vec<Slot>> {
        let tables = self.tables.read().await;
        let mut slots: Vec<Slot> = tables
            .slots
            .values()
            .filter(|slot| query.matches(slot))
            .cloned()
            .collect();
        slots.sort_by(|a, b| (a.date, a.time, a.id).cmp(&(b.date, b.time, b.id)));
        debug!(count = slots.len(), ?query, "Listed slots");
        Ok(slots)
    }

    async fn find_slot(&self, id: SlotId) -> StoreResult<Option<Slot>> {
        let tables = self.tables.read().await;
        Ok(tables.slots.get(&id).cloned())
    }

    async fn find_slot_by_key(&self, key: &NaturalKey) -> StoreResult<Option<Slot>> {
        let tables = self.tables.read().await;
        Ok(tables
            .slot_keys
            .get(key)
            .and_then(|id| tables.slots.get(id))
            .cloned())
    }

    async fn insert_slot(&self, new_slot: &NewSlot) -> StoreResult<Slot> {
        let mut tables = self.tables.write().await;
        if tables.slot_keys.contains_key(&new_slot.key) {
            return Err(StoreError::UniqueViolation(format!(
                "a slot already exists for {}",
                new_slot.key
            )));
        }

        tables.last_slot_id += 1;
        let slot = Slot {
            id: tables.last_slot_id,
            date: new_slot.key.date,
            time: new_slot.key.time,
            teacher: new_slot.key.teacher,
            available: new_slot.available,
            student_number: None,
            present: false,
            notes: None,
            completed: false,
            created_at: Utc::now(),
        };
        tables.slot_keys.insert(new_slot.key, slot.id);
        tables.slots.insert(slot.id, slot.clone());
        Ok(slot)
    }

    async fn set_availability(
        &self,
        id: SlotId,
        expected: bool,
        available: bool,
    ) -> StoreResult<Option<Slot>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .slots
            .get_mut(&id)
            .filter(|slot| !slot.is_booked() && slot.available == expected)
            .map(|slot| {
                slot.available = available;
                slot.clone()
            }))
    }

    async fn assign_student(
        &self,
        id: SlotId,
        student_number: &StudentNumber,
    ) -> StoreResult<Option<Slot>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .slots
            .get_mut(&id)
            .filter(|slot| slot.available && !slot.is_booked())
            .map(|slot| {
                slot.student_number = Some(student_number.clone());
                slot.available = false;
                slot.present = false;
                slot.completed = false;
                slot.clone()
            }))
    }

    async fn update_outcome(
        &self,
        id: SlotId,
        outcome: &AppointmentOutcome,
    ) -> StoreResult<Option<Slot>> {
        let mut tables = self.tables.write().await;
        Ok(tables.slots.get_mut(&id).map(|slot| {
            slot.present = outcome.present;
            slot.notes = outcome.notes.clone();
            slot.completed = outcome.completed;
            slot.clone()
        }))
    }

    async fn delete_unbooked_slot(&self, id: SlotId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let key = match tables.slots.get(&id) {
            Some(slot) if !slot.is_booked() => slot.natural_key(),
            _ => return Ok(false),
        };
        tables.slots.remove(&id);
        tables.slot_keys.remove(&key);
        Ok(true)
    }

    async fn find_students(&self, numbers: &[StudentNumber]) -> StoreResult<Vec<Student>> {
        let tables = self.tables.read().await;
        Ok(numbers
            .iter()
            .filter_map(|number| tables.students.get(number))
            .cloned()
            .collect())
    }

    async fn upsert_student(&self, student: &NewStudent) -> StoreResult<Student> {
        let mut tables = self.tables.write().await;
        let tables = &mut *tables;

        let record = match tables.students.get_mut(&student.student_number) {
            Some(existing) => {
                existing.name = student.name.clone();
                existing.class = student.class;
                existing.topic = student.topic.clone();
                existing.clone()
            }
            None => {
                tables.last_student_id += 1;
                let created = Student {
                    id: tables.last_student_id,
                    student_number: student.student_number.clone(),
                    name: student.name.clone(),
                    class: student.class,
                    topic: student.topic.clone(),
                    created_at: Utc::now(),
                };
                tables
                    .students
                    .insert(created.student_number.clone(), created.clone());
                created
            }
        };
        Ok(record)
    }
}
