use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn notification_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/my-notifications", get(handlers::get_my_notifications))
        .route("/{notification_id}/mark-as-read", post(handlers::mark_as_read))
        .route("/send", post(handlers::send_notification))
        .route("/all", get(handlers::get_all_notifications))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
