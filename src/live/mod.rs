//! Live voice session management
//!
//! This module provides the `LiveSession` abstraction that manages:
//! - Microphone capture and PCM framing for the voice transport
//! - Receiving streamed response fragments and gapless playback scheduling
//! - Barge-in interruption (flush all queued playback)
//! - Session lifecycle (Idle → Starting → Live → Idle) and statistics

mod session;
mod stats;

pub use session::LiveSession;
pub use stats::{LiveStats, SessionState};
