use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use sectorplan_core::{
    messages,
    models::{
        slot::{Appointment, AppointmentOutcome, Slot, SlotId},
        teacher::Teacher,
    },
};

use crate::{
    ApiState,
    middleware::{auth::TeacherIdentity, error_handling::AppError},
    response::ApiResponse,
};

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    Path(teacher): Path<String>,
    identity: TeacherIdentity,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, AppError> {
    let teacher: Teacher = teacher.parse()?;
    identity.ensure_owns(teacher)?;
    let appointments = state.ledger.list_appointments(teacher).await?;

    Ok(Json(ApiResponse::ok(
        messages::appointments_found(appointments.len()),
        appointments,
    )))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<ApiState>>,
    slot_id: Result<Path<SlotId>, PathRejection>,
    identity: TeacherIdentity,
    payload: Result<Json<AppointmentOutcome>, JsonRejection>,
) -> Result<Json<ApiResponse<Slot>>, AppError> {
    let Path(slot_id) = slot_id?;
    let Json(outcome) = payload?;
    identity.ensure_owns_slot(&state.ledger, slot_id).await?;
    let slot = state.ledger.update_appointment(slot_id, outcome).await?;

    Ok(Json(ApiResponse::ok(messages::APPOINTMENT_UPDATED, slot)))
}
