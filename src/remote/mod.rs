pub mod client;
pub mod http;
pub mod live;
pub mod messages;

pub use client::{RemoteServiceClient, VoiceSession};
pub use http::HttpRemoteClient;
pub use live::LiveVoiceSession;
pub use messages::{
    AspectRatio, ChatReply, GroundingRef, ImageQuality, ToolConfig, VideoJobHandle,
    VideoJobStatus, VoiceEvent,
};
