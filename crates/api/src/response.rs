use serde::{Deserialize, Serialize};
use sectorplan_core::errors::ErrorKind;

/// Envelope around every JSON body the API returns.
///
/// `kind` is `null` on success and for gate rejections, which have no
/// booking error kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub kind: Option<ErrorKind>,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            kind: None,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            kind: None,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(kind: Option<ErrorKind>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            kind,
            message: message.into(),
            data: None,
        }
    }
}
