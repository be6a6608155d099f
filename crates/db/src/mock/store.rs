use async_trait::async_trait;
use mockall::mock;
use sectorplan_core::models::slot::{
    AppointmentOutcome, NaturalKey, NewSlot, Slot, SlotId, SlotQuery,
};
use sectorplan_core::models::student::{NewStudent, Student, StudentNumber};
use sectorplan_core::store::{BookingStore, StoreResult};

// Mock store for failure injection in tests
mock! {
    pub Store {}

    #[async_trait]
    impl BookingStore for Store {
        async fn list_slots(&self, query: &SlotQuery) -> StoreResult<Vec<Slot>>;

        async fn find_slot(&self, id: SlotId) -> StoreResult<Option<Slot>>;

        async fn find_slot_by_key(&self, key: &NaturalKey) -> StoreResult<Option<Slot>>;

        async fn insert_slot(&self, slot: &NewSlot) -> StoreResult<Slot>;

        async fn set_availability(
            &self,
            id: SlotId,
            expected: bool,
            available: bool,
        ) -> StoreResult<Option<Slot>>;

        async fn assign_student(
            &self,
            id: SlotId,
            student_number: &StudentNumber,
        ) -> StoreResult<Option<Slot>>;

        async fn update_outcome(
            &self,
            id: SlotId,
            outcome: &AppointmentOutcome,
        ) -> StoreResult<Option<Slot>>;

        async fn delete_unbooked_slot(&self, id: SlotId) -> StoreResult<bool>;

        async fn find_students(&self, numbers: &[StudentNumber]) -> StoreResult<Vec<Student>>;

        async fn upsert_student(&self, student: &NewStudent) -> StoreResult<Student>;
    }
}
