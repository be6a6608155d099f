use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{BookingError, BookingResult};
use crate::models::student::{StudentInfo, StudentNumber};
use crate::models::teacher::Teacher;

pub type SlotId = i64;

/// Start time of a slot, aligned to the half-hour grid. Serialized as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTime {
    minutes: u16,
}

impl SlotTime {
    pub const GRANULARITY_MINUTES: u16 = 30;

    /// First and last start time of the teacher's default day grid.
    const GRID_START: (u8, u8) = (9, 0);
    const GRID_END: (u8, u8) = (16, 0);

    pub fn new(hour: u8, minute: u8) -> BookingResult<Self> {
        if hour > 23 || minute > 59 || u16::from(minute) % Self::GRANULARITY_MINUTES != 0 {
            return Err(BookingError::InvalidArgument(format!(
                "Ongeldige tijd: {hour:02}:{minute:02}"
            )));
        }
        Ok(Self {
            minutes: u16::from(hour) * 60 + u16::from(minute),
        })
    }

    pub fn hour(&self) -> u8 {
        (self.minutes / 60) as u8
    }

    pub fn minute(&self) -> u8 {
        (self.minutes % 60) as u8
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// Start times a teacher can open on a regular school day: 09:00 through
    /// 16:00 in half-hour steps.
    pub fn day_grid() -> Vec<SlotTime> {
        let start = u16::from(Self::GRID_START.0) * 60 + u16::from(Self::GRID_START.1);
        let end = u16::from(Self::GRID_END.0) * 60 + u16::from(Self::GRID_END.1);
        (start..=end)
            .step_by(usize::from(Self::GRANULARITY_MINUTES))
            .map(|minutes| SlotTime { minutes })
            .collect()
    }
}

impl FromStr for SlotTime {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BookingError::InvalidArgument(format!("Ongeldige tijd: '{s}'"));
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.len() != 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour = hour.parse::<u8>().map_err(|_| invalid())?;
        let minute = minute.parse::<u8>().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for SlotTime {
    type Error = BookingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotTime> for String {
    fn from(value: SlotTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// `(date, time, teacher)`: at most one slot exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalKey {
    pub date: NaiveDate,
    pub time: SlotTime,
    pub teacher: Teacher,
}

impl NaturalKey {
    pub fn new(date: NaiveDate, time: SlotTime, teacher: Teacher) -> Self {
        Self {
            date,
            time,
            teacher,
        }
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.date, self.time, self.teacher)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub teacher: Teacher,
    pub available: bool,
    pub student_number: Option<StudentNumber>,
    pub present: bool,
    pub notes: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Slot {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(self.date, self.time, self.teacher)
    }

    pub fn is_booked(&self) -> bool {
        self.student_number.is_some()
    }

    /// Booked and not yet closed by the teacher.
    pub fn is_active_booking(&self) -> bool {
        self.is_booked() && !self.completed
    }
}

/// A slot about to be created. Fresh slots are unbooked, not present, not
/// completed and carry no notes; only availability is chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSlot {
    pub key: NaturalKey,
    pub available: bool,
}

impl NewSlot {
    pub fn open(key: NaturalKey) -> Self {
        Self {
            key,
            available: true,
        }
    }
}

/// What the teacher records after (or instead of) a presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentOutcome {
    pub present: bool,
    #[serde(default)]
    pub notes: Option<String>,
    pub completed: bool,
}

/// A booked slot joined with its student. `student` is `None`, and left out
/// of the JSON, when the slot refers to a student number that has no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(flatten)]
    pub slot: Slot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentInfo>,
}

/// Equality filter over slots. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotQuery {
    pub teacher: Option<Teacher>,
    pub date: Option<NaiveDate>,
    pub available: Option<bool>,
    pub booked: Option<bool>,
    pub student_number: Option<StudentNumber>,
    pub completed: Option<bool>,
}

impl SlotQuery {
    pub fn for_teacher(teacher: Teacher) -> Self {
        Self {
            teacher: Some(teacher),
            ..Self::default()
        }
    }

    pub fn for_student(student_number: StudentNumber) -> Self {
        Self {
            student_number: Some(student_number),
            ..Self::default()
        }
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    pub fn booked(mut self, booked: bool) -> Self {
        self.booked = Some(booked);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn matches(&self, slot: &Slot) -> bool {
        self.teacher.is_none_or(|teacher| slot.teacher == teacher)
            && self.date.is_none_or(|date| slot.date == date)
            && self.available.is_none_or(|available| slot.available == available)
            && self.booked.is_none_or(|booked| slot.is_booked() == booked)
            && self
                .student_number
                .as_ref()
                .is_none_or(|number| slot.student_number.as_ref() == Some(number))
            && self.completed.is_none_or(|completed| slot.completed == completed)
    }
}
