// libs/provider-cell/src/router.rs
use axum::{
    routing::{get, patch, post, put},
    Router,
};

use shared_store::AppState;

use crate::handlers;

pub fn provider_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::register_provider))
        .route("/{provider_id}", get(handlers::get_provider))
        .route("/{provider_id}/availability", put(handlers::put_availability))
        .route("/{provider_id}/availability", get(handlers::get_availability))
        .route("/{provider_id}/blocked-ranges", post(handlers::create_blocked_range))
        .route("/{provider_id}/blocked-ranges", get(handlers::list_blocked_ranges))
        .route("/blocked-ranges/{range_id}", patch(handlers::update_blocked_range))
        .with_state(state)
}

pub fn requester_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::register_requester))
        .with_state(state)
}
