use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn payment_routes(state: Arc<AppConfig>) -> Router {
    // Clients may read; create/update/delete check for a privileged role.
    let protected_routes = Router::new()
        .route("/", get(handlers::get_payments))
        .route("/", post(handlers::create_payment))
        .route("/{payment_id}", get(handlers::get_payment))
        .route("/{payment_id}", put(handlers::update_payment))
        .route("/{payment_id}", delete(handlers::delete_payment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
