//! # Teacher Gate
//!
//! Teachers sign in with an external identity provider that forwards the
//! signed-in teacher's name in a request header (`x-teacher-identity` unless
//! configured otherwise). The service trusts that header; it never sees
//! credentials itself.

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sectorplan_core::{
    ledger::BookingLedger,
    models::{slot::SlotId, teacher::Teacher},
};
use tracing::warn;

use crate::ApiState;
use crate::middleware::error_handling::AppError;

/// The teacher asserted by the identity provider. Extracting it rejects the
/// request with 401 when the header is missing or names no known teacher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeacherIdentity(pub Teacher);

impl TeacherIdentity {
    /// 403 unless the signed-in teacher is `teacher`.
    pub fn ensure_owns(&self, teacher: Teacher) -> Result<(), AppError> {
        if self.0 != teacher {
            warn!(signed_in = %self.0, requested = %teacher, "Teacher acting on another planning");
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    /// 403 unless `slot_id` belongs to the signed-in teacher. An unknown slot
    /// passes so the operation itself can answer with its own 404.
    pub async fn ensure_owns_slot(
        &self,
        ledger: &BookingLedger,
        slot_id: SlotId,
    ) -> Result<(), AppError> {
        match ledger.find_slot(slot_id).await? {
            Some(slot) => self.ensure_owns(slot.teacher),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for TeacherIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(&state.identity_header) else {
            return Err(AppError::Unauthorized);
        };
        let teacher = value
            .to_str()
            .ok()
            .and_then(|name| name.parse::<Teacher>().ok())
            .ok_or_else(|| {
                warn!(header = %state.identity_header, "Unknown teacher identity");
                AppError::Unauthorized
            })?;

        Ok(TeacherIdentity(teacher))
    }
}
