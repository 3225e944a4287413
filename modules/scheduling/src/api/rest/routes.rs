use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::SchedulingService;

/// Build the scheduling router. The service travels as an extension so the
/// host application can mount this under any prefix.
pub fn router(service: Arc<SchedulingService>) -> Router {
    Router::new()
        .route("/slots", get(handlers::list_slots))
        .route(
            "/bookings",
            get(handlers::list_appointments).post(handlers::book_appointment),
        )
        .route(
            "/bookings/{id}",
            get(handlers::get_appointment).delete(handlers::cancel_appointment),
        )
        .route("/bookings/{id}/confirm", post(handlers::confirm_appointment))
        .route(
            "/availability",
            get(handlers::list_patterns).post(handlers::create_pattern),
        )
        .route("/availability/{id}", delete(handlers::deactivate_pattern))
        .route(
            "/blocks",
            get(handlers::list_blocks).post(handlers::create_block),
        )
        .route("/blocks/{id}", delete(handlers::delete_block))
        .layer(Extension(service))
}
