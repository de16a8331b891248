use axum::{routing::get, Router};

use provider_cell::router::{provider_routes, requester_routes};
use scheduling_cell::router::appointment_routes;
use shared_store::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Relay Scheduling API is running!" }))
        .nest("/providers", provider_routes(state.clone()))
        .nest("/requesters", requester_routes(state.clone()))
        .nest("/appointments", appointment_routes(state))
}
