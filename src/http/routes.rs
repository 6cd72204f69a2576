use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Request dispatch and results
        .route("/ai/submit", post(handlers::submit))
        .route("/ai/results", get(handlers::list_results))
        // Studio flows
        .route("/ai/studio/generate", post(handlers::generate_post))
        .route("/ai/studio/enhance", post(handlers::enhance_prompt))
        .route("/ai/speech", post(handlers::synthesize_speech))
        // Live voice session control
        .route("/live/start", post(handlers::start_live))
        .route("/live/stop", post(handlers::stop_live))
        .route("/live/status", get(handlers::live_status))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
