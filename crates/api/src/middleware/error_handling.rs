//! # Error Handling Middleware
//!
//! Maps ledger errors and gate rejections to HTTP status codes and the JSON
//! envelope, so every failure looks the same to the presentation layer.

use axum::{
    BoxError, Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sectorplan_core::errors::{BookingError, ErrorKind};
use tower::timeout::error::Elapsed;
use tracing::error;

use crate::response::ApiResponse;

pub const UNAUTHORIZED_MESSAGE: &str = "Log in als docent om de planning te beheren.";
pub const FORBIDDEN_MESSAGE: &str = "Je hebt geen toegang tot de planning van deze docent.";

/// Error returned by every handler.
///
/// # Example
///
/// ```
/// use axum::Json;
/// use sectorplan_api::middleware::error_handling::AppError;
/// use sectorplan_core::errors::BookingError;
///
/// async fn handler() -> Result<Json<()>, AppError> {
///     Err(BookingError::NotFound("Tijdslot niet gevonden.".to_string()).into())
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub enum AppError {
    Booking(BookingError),
    /// No or an unknown teacher identity on a teacher-only route.
    Unauthorized,
    /// A signed-in teacher acting on another teacher's planning.
    Forbidden,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Booking(err) => match err.kind() {
                ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::PartialFailure | ErrorKind::OperationFailed => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Booking(err) => {
                if status.is_server_error() {
                    error!(status = status.as_u16(), error = %err, "Request failed");
                }
                ApiResponse::failure(Some(err.kind()), err.user_message())
            }
            AppError::Unauthorized => ApiResponse::failure(None, UNAUTHORIZED_MESSAGE),
            AppError::Forbidden => ApiResponse::failure(None, FORBIDDEN_MESSAGE),
        };

        (status, Json(body)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Booking(err)
    }
}

/// Malformed or missing JSON bodies are reported in the envelope like any
/// other invalid input.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Booking(BookingError::InvalidArgument(rejection.body_text()))
    }
}

/// Unparseable slot ids and the like.
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Booking(BookingError::InvalidArgument(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Booking(BookingError::InvalidArgument(rejection.body_text()))
    }
}

pub fn map_error(err: BookingError) -> Response {
    AppError::from(err).into_response()
}

/// Errors raised by the transport layers around the router. The whole-request
/// timeout becomes a `Timeout` envelope like a slow store would.
pub async fn handle_layer_error(err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        return map_error(BookingError::Timeout("request".to_string()));
    }
    map_error(BookingError::OperationFailed(eyre::eyre!(
        "unhandled layer error: {err}"
    )))
}
