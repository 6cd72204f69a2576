pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod live;
pub mod orchestrator;
pub mod remote;

pub use audio::{
    CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureFrame, CaptureSource,
    FixtureCapture, NullSink, PlaybackScheduler, PlaybackSink, SourceId,
};
pub use config::Config;
pub use error::{HubError, Result};
pub use http::{create_router, AppState};
pub use live::{LiveSession, LiveStats, SessionState};
pub use orchestrator::{
    MediaAttachment, Mode, Orchestrator, Request, RequestOptions, ResultEntry, ResultLog,
    ResultPayload, SubmitOutcome,
};
pub use remote::{
    AspectRatio, ChatReply, GroundingRef, HttpRemoteClient, ImageQuality, RemoteServiceClient,
    ToolConfig, VideoJobHandle, VideoJobStatus, VoiceEvent, VoiceSession,
};
