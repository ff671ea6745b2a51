use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn account_routes(state: Arc<AppConfig>) -> Router {
    // Everything here is scoped to the authenticated caller.
    let protected_routes = Router::new()
        .route("/profile", get(handlers::get_profile))
        .route("/update-profile", put(handlers::update_profile))
        .route("/change-password", put(handlers::change_password))
        .route("/my-appointments", get(handlers::get_my_appointments))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
