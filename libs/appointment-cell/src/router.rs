use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // Reads are open to any authenticated caller; mutations check for a
    // privileged role inside the handlers.
    let protected_routes = Router::new()
        .route("/", get(handlers::get_appointments))
        .route("/", post(handlers::add_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}", put(handlers::update_appointment))
        .route("/{appointment_id}", delete(handlers::delete_appointment))
        .route("/{appointment_id}/status-history", get(handlers::get_status_history))
        .route("/{appointment_id}/status", post(handlers::add_status_record))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
