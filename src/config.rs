use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub remote: RemoteConfig,
    pub orchestrator: OrchestratorSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Microphone capture rate in Hz (the voice endpoint expects 16 kHz)
    pub capture_rate: u32,
    /// Response playback rate in Hz (the voice endpoint emits 24 kHz)
    pub playback_rate: u32,
    /// Samples per capture frame sent over the live session
    pub frame_samples: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            capture_rate: 16000,
            playback_rate: 24000,
            frame_samples: 4096,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the generation REST API
    pub base_url: String,
    /// Websocket URL of the live voice endpoint
    pub voice_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorSettings {
    /// Seconds between video job polls
    pub poll_interval_secs: u64,
    /// Maximum polls before a video job is abandoned (None = unbounded)
    pub max_polls: Option<u32>,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
            max_polls: Some(180),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
