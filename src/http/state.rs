use crate::config::AudioConfig;
use crate::live::LiveSession;
use crate::orchestrator::Orchestrator;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Request dispatch and the result log
    pub orchestrator: Arc<Orchestrator>,
    /// The (at most one) live voice session
    pub live: Arc<LiveSession>,
    /// Sample rates the remote produces audio at
    pub audio: AudioConfig,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        live: Arc<LiveSession>,
        audio: AudioConfig,
    ) -> Self {
        Self {
            orchestrator,
            live,
            audio,
        }
    }
}
