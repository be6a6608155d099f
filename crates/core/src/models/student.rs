use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::BookingError;

/// School-issued student number: the business identity of a [`Student`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentNumber(String);

impl StudentNumber {
    pub const MIN_DIGITS: usize = 5;
    pub const MAX_DIGITS: usize = 8;

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StudentNumber {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(BookingError::InvalidArgument(
                "Leerlingnummer mag alleen cijfers bevatten".to_string(),
            ));
        }
        if digits.len() < Self::MIN_DIGITS {
            return Err(BookingError::InvalidArgument(format!(
                "Leerlingnummer moet minimaal {} cijfers bevatten",
                Self::MIN_DIGITS
            )));
        }
        if digits.len() > Self::MAX_DIGITS {
            return Err(BookingError::InvalidArgument(format!(
                "Leerlingnummer mag maximaal {} cijfers bevatten",
                Self::MAX_DIGITS
            )));
        }
        Ok(Self(digits.to_string()))
    }
}

impl TryFrom<String> for StudentNumber {
    type Error = BookingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StudentNumber> for String {
    fn from(value: StudentNumber) -> Self {
        value.0
    }
}

impl fmt::Display for StudentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudentClass {
    #[serde(rename = "4GT1")]
    Gt1,
    #[serde(rename = "4GT2")]
    Gt2,
    #[serde(rename = "4GT3")]
    Gt3,
    #[serde(rename = "4GT4")]
    Gt4,
}

impl StudentClass {
    pub const ALL: [StudentClass; 4] = [
        StudentClass::Gt1,
        StudentClass::Gt2,
        StudentClass::Gt3,
        StudentClass::Gt4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StudentClass::Gt1 => "4GT1",
            StudentClass::Gt2 => "4GT2",
            StudentClass::Gt3 => "4GT3",
            StudentClass::Gt4 => "4GT4",
        }
    }
}

impl fmt::Display for StudentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentClass {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        StudentClass::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| BookingError::InvalidArgument("Selecteer een klas".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub student_number: StudentNumber,
    pub name: String,
    pub class: StudentClass,
    pub topic: String,
    pub created_at: DateTime<Utc>,
}

/// Student details as written by a booking; stores upsert on `student_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub student_number: StudentNumber,
    pub name: String,
    pub class: StudentClass,
    pub topic: String,
}

/// The subset of a student shown next to an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentInfo {
    pub name: String,
    pub class: StudentClass,
    pub topic: String,
}

impl From<&Student> for StudentInfo {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            class: student.class,
            topic: student.topic.clone(),
        }
    }
}

/// A validated request to book a slot. Built by
/// [`crate::validation::parse_booking_form`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub name: String,
    pub class: StudentClass,
    pub student_number: StudentNumber,
    pub topic: String,
}

impl From<BookingRequest> for NewStudent {
    fn from(request: BookingRequest) -> Self {
        Self {
            student_number: request.student_number,
            name: request.name.trim().to_string(),
            class: request.class,
            topic: request.topic.trim().to_string(),
        }
    }
}
