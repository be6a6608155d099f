use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages;
use crate::models::{slot::SlotId, student::StudentNumber};

/// Stable, machine-readable classification of a [`BookingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    Conflict,
    NotFound,
    Timeout,
    Unavailable,
    PartialFailure,
    OperationFailed,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The student record was written but the slot was not claimed.
    #[error("Partial failure: student {student_number} saved but slot {slot_id} not updated: {source}")]
    PartialFailure {
        slot_id: SlotId,
        student_number: StudentNumber,
        source: Box<BookingError>,
    },

    #[error("Operation failed: {0}")]
    OperationFailed(#[from] eyre::Report),
}

pub type BookingResult<T> = Result<T, BookingError>;

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            BookingError::Conflict(_) => ErrorKind::Conflict,
            BookingError::NotFound(_) => ErrorKind::NotFound,
            BookingError::Timeout(_) => ErrorKind::Timeout,
            BookingError::Unavailable(_) => ErrorKind::Unavailable,
            BookingError::PartialFailure { .. } => ErrorKind::PartialFailure,
            BookingError::OperationFailed(_) => ErrorKind::OperationFailed,
        }
    }

    /// The short text shown to the person who triggered the operation.
    ///
    /// Rule violations carry their own wording; infrastructure failures map to
    /// fixed texts so internal details never reach the presentation layer.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::InvalidArgument(msg)
            | BookingError::Conflict(msg)
            | BookingError::NotFound(msg) => msg.clone(),
            BookingError::Timeout(_) => messages::TIMEOUT.to_string(),
            BookingError::Unavailable(_) => messages::STORE_UNAVAILABLE.to_string(),
            BookingError::PartialFailure { .. } => messages::PARTIAL_BOOKING.to_string(),
            BookingError::OperationFailed(_) => messages::GENERIC_FAILURE.to_string(),
        }
    }
}
