use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use crate::app_state::AppState;
use super::auth::require_access_key;
use super::handlers::{get_log_payload, get_logs, health_check};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/logs/:log_id", get(get_log_payload))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            require_access_key,
        ));

    Router::new()
        .route("/", get(|| async { "API Fetch Log Server" }))
        .route("/health", get(health_check))
        .route("/logs", get(get_logs))
        .merge(protected)
        .with_state(app_state)
}
