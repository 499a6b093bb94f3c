pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // HTML surface
        .route("/", get(handlers::handle_index))
        .route("/analyze", post(handlers::handle_analyze_page))
        // JSON surface
        .route("/api/v1/analyze", post(handlers::handle_analyze_api))
        .route(
            "/api/v1/analyses/:request_id/cancel",
            post(handlers::handle_cancel),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
