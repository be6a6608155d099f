//! Input rules applied before anything touches the store.
//!
//! Field errors are collected rather than reported one at a time, so a form
//! with several mistakes gets a single message listing all of them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{BookingError, BookingResult};
use crate::models::slot::{NaturalKey, SlotTime};
use crate::models::student::{BookingRequest, StudentClass, StudentNumber};
use crate::models::teacher::Teacher;

pub const NAME_MIN_CHARS: usize = 2;
/// Fits the `students.name` column.
pub const NAME_MAX_CHARS: usize = 100;
pub const TOPIC_MIN_CHARS: usize = 5;
pub const TOPIC_MAX_CHARS: usize = 100;

/// Booking form exactly as submitted, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingForm {
    pub name: String,
    pub class: String,
    pub student_number: String,
    pub topic: String,
}

pub fn parse_booking_form(form: &BookingForm) -> BookingResult<BookingRequest> {
    let mut problems = Vec::new();

    if let Err(err) = validate_name(&form.name) {
        problems.push(err.user_message());
    }
    let class = form
        .class
        .parse::<StudentClass>()
        .map_err(|err| problems.push(err.user_message()))
        .ok();
    let student_number = form
        .student_number
        .parse::<StudentNumber>()
        .map_err(|err| problems.push(err.user_message()))
        .ok();
    if let Err(err) = validate_topic(&form.topic) {
        problems.push(err.user_message());
    }

    match (class, student_number) {
        (Some(class), Some(student_number)) if problems.is_empty() => Ok(BookingRequest {
            name: form.name.trim().to_string(),
            class,
            student_number,
            topic: form.topic.trim().to_string(),
        }),
        _ => Err(BookingError::InvalidArgument(problems.join("; "))),
    }
}

/// Re-checks the free-text fields of an already typed request.
pub fn validate_request(request: &BookingRequest) -> BookingResult<()> {
    validate_name(&request.name)?;
    validate_topic(&request.topic)
}

pub fn validate_name(name: &str) -> BookingResult<()> {
    let len = name.trim().chars().count();
    if len < NAME_MIN_CHARS {
        return Err(BookingError::InvalidArgument(format!(
            "Naam moet minimaal {NAME_MIN_CHARS} karakters bevatten"
        )));
    }
    if len > NAME_MAX_CHARS {
        return Err(BookingError::InvalidArgument(format!(
            "Naam mag maximaal {NAME_MAX_CHARS} karakters bevatten"
        )));
    }
    Ok(())
}

pub fn validate_topic(topic: &str) -> BookingResult<()> {
    let len = topic.trim().chars().count();
    if len < TOPIC_MIN_CHARS {
        return Err(BookingError::InvalidArgument(format!(
            "Onderwerp moet minimaal {TOPIC_MIN_CHARS} karakters bevatten"
        )));
    }
    if len > TOPIC_MAX_CHARS {
        return Err(BookingError::InvalidArgument(format!(
            "Onderwerp mag maximaal {TOPIC_MAX_CHARS} karakters bevatten"
        )));
    }
    Ok(())
}

/// Parses an ISO `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| BookingError::InvalidArgument(format!("Ongeldige datum: '{}'", raw.trim())))
}

pub fn parse_natural_key(date: &str, time: &str, teacher: Teacher) -> BookingResult<NaturalKey> {
    Ok(NaturalKey::new(parse_date(date)?, time.parse::<SlotTime>()?, teacher))
}
