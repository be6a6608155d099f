//! # Slot Handlers
//!
//! Student-facing listing, booking and calendar export, plus the teacher's
//! day view, toggle and delete.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use sectorplan_core::{
    errors::BookingError,
    messages,
    models::{
        slot::{Slot, SlotId},
        teacher::Teacher,
    },
    validation::{self, BookingForm},
};

use crate::{
    ApiState,
    middleware::{auth::TeacherIdentity, error_handling::AppError},
    response::ApiResponse,
};

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub date: String,
    pub time: String,
}

#[axum::debug_handler]
pub async fn list_available_slots(
    State(state): State<Arc<ApiState>>,
    Path(teacher): Path<String>,
) -> Result<Json<ApiResponse<Vec<Slot>>>, AppError> {
    let teacher: Teacher = teacher.parse()?;
    let slots = state.ledger.list_available_slots(teacher).await?;

    Ok(Json(ApiResponse::ok(messages::slots_found(slots.len()), slots)))
}

#[axum::debug_handler]
pub async fn book_slot(
    State(state): State<Arc<ApiState>>,
    slot_id: Result<Path<SlotId>, PathRejection>,
    payload: Result<Json<BookingForm>, JsonRejection>,
) -> Result<Json<ApiResponse<Slot>>, AppError> {
    let Path(slot_id) = slot_id?;
    let Json(form) = payload?;
    let request = validation::parse_booking_form(&form)?;
    let slot = state.ledger.book_slot(slot_id, request).await?;

    Ok(Json(ApiResponse::ok(messages::BOOKED, slot)))
}

/// Raw `text/calendar` download rather than the JSON envelope.
#[axum::debug_handler]
pub async fn appointment_calendar(
    State(state): State<Arc<ApiState>>,
    slot_id: Result<Path<SlotId>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(slot_id) = slot_id?;
    let ics = state
        .ledger
        .appointment_calendar(slot_id, &state.calendar)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sectorwerkstuk.ics\"",
            ),
        ],
        ics,
    ))
}

#[axum::debug_handler]
pub async fn list_slots_for_date(
    State(state): State<Arc<ApiState>>,
    Path(teacher): Path<String>,
    identity: TeacherIdentity,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Slot>>>, AppError> {
    let teacher: Teacher = teacher.parse()?;
    identity.ensure_owns(teacher)?;
    let Query(query) = query?;
    let raw = query
        .date
        .ok_or_else(|| BookingError::InvalidArgument("Selecteer een datum".to_string()))?;
    let date = validation::parse_date(&raw)?;
    let slots = state.ledger.list_slots_for_date(date, teacher).await?;

    Ok(Json(ApiResponse::ok(messages::slots_found(slots.len()), slots)))
}

#[axum::debug_handler]
pub async fn toggle_or_create_slot(
    State(state): State<Arc<ApiState>>,
    Path(teacher): Path<String>,
    identity: TeacherIdentity,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Slot>>), AppError> {
    let teacher: Teacher = teacher.parse()?;
    identity.ensure_owns(teacher)?;
    let Json(toggle) = payload?;
    let key = validation::parse_natural_key(&toggle.date, &toggle.time, teacher)?;
    let change = state.ledger.toggle_or_create_slot(key).await?;

    let status = if change.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let message = change.message();
    Ok((status, Json(ApiResponse::ok(message, change.slot))))
}

#[axum::debug_handler]
pub async fn delete_slot(
    State(state): State<Arc<ApiState>>,
    slot_id: Result<Path<SlotId>, PathRejection>,
    identity: TeacherIdentity,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let Path(slot_id) = slot_id?;
    identity.ensure_owns_slot(&state.ledger, slot_id).await?;
    state.ledger.delete_slot(slot_id).await?;

    Ok(Json(ApiResponse::message(messages::SLOT_DELETED)))
}
