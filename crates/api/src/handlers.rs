pub mod appointments;
pub mod slots;
