//! HTTP API server for external control (the VibeFlow front end)
//!
//! This module provides a REST API over the hub core:
//! - POST /ai/submit - Dispatch a chat/video/analyze/remix operation
//! - GET /ai/results - Result log, most recent first
//! - POST /ai/studio/generate - Generate an image post
//! - POST /ai/studio/enhance - Enhance an image prompt
//! - POST /ai/speech - Synthesize speech for a text result
//! - POST /live/start, /live/stop, GET /live/status - Live voice session
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
