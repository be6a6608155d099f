pub mod slot;
pub mod student;
pub mod teacher;
