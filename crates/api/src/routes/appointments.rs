use axum::{
    Router,
    routing::{get, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/teachers/:teacher/appointments",
            get(handlers::appointments::list_appointments),
        )
        .route(
            "/api/slots/:id/appointment",
            put(handlers::appointments::update_appointment),
        )
}
