pub mod slot;
pub mod student;
