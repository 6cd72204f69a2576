use super::messages::{
    AspectRatio, ChatReply, ImageQuality, ToolConfig, VideoJobHandle, VideoJobStatus, VoiceEvent,
};
use crate::error::Result;
use tokio::sync::mpsc;

/// The hub's single external boundary: the hosted generation service.
///
/// All media crosses this interface as raw bytes plus a MIME type; base64
/// belongs to transport implementations only. Video generation is
/// asynchronous on the server: `submit_video_job` returns a handle that is
/// polled until done, then the finished clip is fetched by URI.
#[async_trait::async_trait]
pub trait RemoteServiceClient: Send + Sync {
    /// Single-turn chat completion with optional tool grounding and an
    /// optional extended-reasoning budget.
    async fn chat_complete(
        &self,
        message: &str,
        tools: ToolConfig,
        thinking_budget: Option<u32>,
    ) -> Result<ChatReply>;

    /// Generate an image from a prompt. Returns encoded image bytes.
    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        quality: ImageQuality,
    ) -> Result<Vec<u8>>;

    /// Transform an existing image per the instruction. Returns image bytes.
    async fn edit_image(&self, image: &[u8], mime_type: &str, instruction: &str)
        -> Result<Vec<u8>>;

    /// Describe attached media. Returns descriptive text.
    async fn analyze(&self, media: &[u8], mime_type: &str, instruction: &str) -> Result<String>;

    /// Rewrite an image prompt to be more descriptive via the fast model.
    async fn enhance_prompt(&self, prompt: &str) -> Result<String>;

    /// Submit an asynchronous video generation job.
    async fn submit_video_job(
        &self,
        prompt: &str,
        seed_image: Option<&[u8]>,
        aspect_ratio: AspectRatio,
    ) -> Result<VideoJobHandle>;

    /// Check a video job's progress.
    async fn poll_video_job(&self, job: &VideoJobHandle) -> Result<VideoJobStatus>;

    /// Download a finished video by its URI.
    async fn fetch_video(&self, uri: &str) -> Result<Vec<u8>>;

    /// Open a bidirectional streaming voice session.
    ///
    /// Returns the send/close half and a typed event stream; the receiver
    /// yields `Closed` (or ends) when the session is gone.
    async fn open_voice_session(&self)
        -> Result<(Box<dyn VoiceSession>, mpsc::Receiver<VoiceEvent>)>;

    /// Synthesize speech. Returns raw 24 kHz mono 16-bit PCM bytes.
    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>>;
}

/// Outbound half of an open voice session.
#[async_trait::async_trait]
pub trait VoiceSession: Send + Sync {
    /// Send one realtime-input frame of raw 16-bit little-endian PCM.
    ///
    /// Fire-and-forget: no back-pressure is applied; if the transport cannot
    /// keep up, frames queue at the transport layer (known limitation).
    async fn send_frame(&self, pcm: &[u8]) -> Result<()>;

    /// Close the session. Idempotent.
    async fn close(&self) -> Result<()>;
}
