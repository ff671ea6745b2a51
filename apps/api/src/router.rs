use std::sync::Arc;

use axum::{routing::get, Router};

use account_cell::router::account_routes;
use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use billing_cell::router::payment_routes;
use catalog_cell::router::service_routes;
use notification_cell::router::notification_routes;
use review_cell::router::review_routes;
use shared_config::AppConfig;
use user_cell::router::user_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Bookwell API is running!" }))
        .nest("/api/auth", auth_routes(state.clone()))
        .nest("/api/account", account_routes(state.clone()))
        .nest("/api/appointments", appointment_routes(state.clone()))
        .nest("/api/services", service_routes(state.clone()))
        .nest("/api/users", user_routes(state.clone()))
        .nest("/api/payments", payment_routes(state.clone()))
        .nest("/api/reviews", review_routes(state.clone()))
        .nest("/api/notifications", notification_routes(state))
}
