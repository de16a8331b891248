// libs/scheduling-cell/src/router.rs
use axum::{
    routing::{get, post},
    Router,
};

use shared_store::AppState;

use crate::handlers;

pub fn appointment_routes(state: AppState) -> Router {
    Router::new()
        .route("/slots", get(handlers::get_slots))
        .route("/", post(handlers::book_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/requesters/{requester_id}", get(handlers::list_for_requester))
        .route("/providers/{provider_id}", get(handlers::list_for_provider))
        .route("/{appointment_id}/confirm", post(handlers::confirm_appointment))
        .route("/{appointment_id}/check-in", post(handlers::check_in_appointment))
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/{appointment_id}/no-show", post(handlers::no_show_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/{appointment_id}/reschedule", post(handlers::reschedule_appointment))
        .route("/{appointment_id}/rating", post(handlers::rate_appointment))
        .with_state(state)
}
