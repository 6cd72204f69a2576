pub mod capture;
pub mod pcm;
pub mod playback;
pub mod wav;

pub use capture::{
    CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureFrame, CaptureSource,
    FixtureCapture,
};
pub use playback::{NullSink, PlaybackScheduler, PlaybackSink, SourceId};
