use crate::remote::{AspectRatio, ToolConfig};
use serde::{Deserialize, Serialize};

use super::log::ResultEntry;

/// Extended-reasoning budget cap for the pro chat model.
pub const THINKING_BUDGET_PRO: u32 = 32768;
/// Extended-reasoning budget cap for the lighter model used with maps.
pub const THINKING_BUDGET_LITE: u32 = 24576;

/// What the user asked the hub to do with the input bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Single-turn chat completion
    Chat,
    /// Asynchronous video generation (submit + poll)
    Video,
    /// Describe attached media
    Analyze,
    /// Transform an attached image
    Remix,
}

/// Binary media attached to a request: raw bytes plus a MIME type. Base64
/// never reaches this type; it is decoded at whatever boundary it arrived on.
#[derive(Debug, Clone)]
pub struct MediaAttachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Per-mode option flags.
#[derive(Debug, Clone, Copy)]
pub struct RequestOptions {
    /// Web-search grounding (chat)
    pub search: bool,
    /// Maps grounding (chat; routes to the lighter model)
    pub maps: bool,
    /// Extended reasoning (chat)
    pub thinking: bool,
    /// Aspect ratio (video)
    pub aspect_ratio: AspectRatio,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            search: false,
            maps: false,
            thinking: false,
            aspect_ratio: AspectRatio::Vertical,
        }
    }
}

impl RequestOptions {
    pub fn tools(&self) -> ToolConfig {
        ToolConfig {
            search: self.search,
            maps: self.maps,
        }
    }

    /// Reasoning budget for the model the options route to: maps grounding
    /// selects the lighter model, which caps the budget lower.
    pub fn thinking_budget(&self) -> Option<u32> {
        if !self.thinking {
            return None;
        }
        Some(if self.maps {
            THINKING_BUDGET_LITE
        } else {
            THINKING_BUDGET_PRO
        })
    }
}

/// One user-initiated operation.
#[derive(Debug, Clone)]
pub struct Request {
    pub mode: Mode,
    /// May be empty when media is attached
    pub prompt: String,
    pub media: Option<MediaAttachment>,
    pub options: RequestOptions,
}

impl Request {
    pub fn new(mode: Mode, prompt: impl Into<String>) -> Self {
        Self {
            mode,
            prompt: prompt.into(),
            media: None,
            options: RequestOptions::default(),
        }
    }

    pub fn with_media(mut self, bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        self.media = Some(MediaAttachment {
            bytes,
            mime_type: mime_type.into(),
        });
        self
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// The result appended to the log
    pub entry: ResultEntry,
    /// Signal for the host to clear the prompt input (the orchestrator
    /// signals this side effect, it does not perform it)
    pub clear_input: bool,
}
