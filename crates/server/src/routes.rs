//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health_check))
        .route("/v1/allocations", post(handlers::create_allocation))
        .route("/v1/events", post(handlers::handle_event))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
