use serde::{Deserialize, Serialize};

/// Aspect ratios supported by the generation models.
///
/// Video generation accepts only `Widescreen` (16:9) and `Vertical` (9:16);
/// the orchestrator enforces that before submitting a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "2:3")]
    TwoThree,
    #[serde(rename = "3:2")]
    ThreeTwo,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "4:3")]
    Feed,
    #[serde(rename = "9:16")]
    Vertical,
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "21:9")]
    Cinema,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::TwoThree => "2:3",
            AspectRatio::ThreeTwo => "3:2",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Feed => "4:3",
            AspectRatio::Vertical => "9:16",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Cinema => "21:9",
        }
    }

    /// Whether video generation supports this ratio.
    pub fn supports_video(&self) -> bool {
        matches!(self, AspectRatio::Widescreen | AspectRatio::Vertical)
    }
}

/// Output resolution tier for image generation. `OneK` routes to the light
/// image model; higher tiers require the pro image model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageQuality {
    #[serde(rename = "1K")]
    OneK,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::OneK => "1K",
            ImageQuality::TwoK => "2K",
            ImageQuality::FourK => "4K",
        }
    }
}

/// Tool augmentation flags for chat completions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolConfig {
    /// Web-search grounding
    pub search: bool,
    /// Maps grounding (routes chat to the lighter model)
    pub maps: bool,
}

/// A retrieved source backing a grounded chat reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingRef {
    pub title: Option<String>,
    pub uri: Option<String>,
}

/// Chat completion reply.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    pub grounding: Vec<GroundingRef>,
}

/// Opaque reference to a server-side long-running video generation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoJobHandle {
    /// Operation name assigned by the service
    pub operation: String,
}

/// Snapshot of a video job's progress.
#[derive(Debug, Clone)]
pub struct VideoJobStatus {
    pub done: bool,
    /// Download URI, present once the job is done
    pub video_uri: Option<String>,
}

/// Events delivered by an open voice session.
///
/// The transport turns its callback surface into this typed stream so the
/// live session consumes fragments and interrupts from one channel, on one
/// task, with no callback re-entrancy.
#[derive(Debug, Clone)]
pub enum VoiceEvent {
    /// A chunk of response audio: raw 16-bit little-endian PCM bytes
    AudioFragment(Vec<u8>),
    /// The user spoke over the response; flush all queued playback
    Interrupted,
    /// The session closed (remotely or after `close()`)
    Closed,
}
