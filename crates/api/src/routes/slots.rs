use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/teachers/:teacher/slots/available",
            get(handlers::slots::list_available_slots),
        )
        .route(
            "/api/teachers/:teacher/slots",
            get(handlers::slots::list_slots_for_date),
        )
        .route(
            "/api/teachers/:teacher/slots/toggle",
            post(handlers::slots::toggle_or_create_slot),
        )
        .route("/api/slots/:id/book", post(handlers::slots::book_slot))
        .route(
            "/api/slots/:id/calendar.ics",
            get(handlers::slots::appointment_calendar),
        )
        .route("/api/slots/:id", delete(handlers::slots::delete_slot))
}
