//! # Sectorplan Core
//!
//! Domain types and booking rules for the presentation planner: students book a
//! half-hour slot with one of the teachers, teachers open and close slots and
//! record how each appointment went.
//!
//! - [`models`]: slots, students and teachers
//! - [`validation`]: input rules for booking forms, dates and times
//! - [`store`]: the persistence port adapters implement
//! - [`ledger`]: the booking rules, written once against the port
//! - [`calendar`]: iCalendar export of a booked appointment
//! - [`errors`]: the error taxonomy every operation reports through

pub mod calendar;
pub mod errors;
pub mod ledger;
pub mod messages;
pub mod models;
pub mod store;
pub mod validation;
