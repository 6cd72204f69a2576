use crate::error::{HubError, Result};
use tokio::sync::mpsc;

/// One buffer of microphone audio (mono floating-point samples).
#[derive(Debug, Clone)]
pub struct CaptureFrame {
    /// Raw samples in [-1.0, 1.0] (nominal; out-of-range values pass through)
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for a capture backend
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate (the voice endpoint expects 16 kHz)
    pub sample_rate: u32,
    /// Samples per frame pulled from the device
    pub frame_samples: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            frame_samples: 4096,
        }
    }
}

/// Microphone capture backend trait
///
/// Implementations:
/// - Platform: OS microphone (not bundled; integration point for hosts)
/// - Fixture: replays scripted frames (for testing/batch processing)
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive capture frames
    async fn start(&mut self) -> Result<mpsc::Receiver<CaptureFrame>>;

    /// Stop capturing audio and release the device
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Where capture frames come from
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// OS microphone
    Microphone,
    /// Scripted frames (for testing)
    Fixture(Vec<Vec<f32>>),
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    pub fn create(source: CaptureSource, config: CaptureConfig) -> Result<Box<dyn CaptureBackend>> {
        match source {
            // TODO: cpal microphone backend; until then hosts feed fixtures
            CaptureSource::Microphone => Err(HubError::Permission(
                "microphone capture requires a platform audio backend".to_string(),
            )),
            CaptureSource::Fixture(frames) => Ok(Box::new(FixtureCapture::new(frames, config))),
        }
    }
}

/// Replays a fixed list of frames, then closes the channel.
pub struct FixtureCapture {
    frames: Vec<Vec<f32>>,
    config: CaptureConfig,
    capturing: bool,
}

impl FixtureCapture {
    pub fn new(frames: Vec<Vec<f32>>, config: CaptureConfig) -> Self {
        Self {
            frames,
            config,
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FixtureCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<CaptureFrame>> {
        let (tx, rx) = mpsc::channel(self.frames.len().max(1));

        let frames = self.frames.clone();
        let sample_rate = self.config.sample_rate;

        tokio::spawn(async move {
            let mut elapsed_ms = 0u64;
            for samples in frames {
                let frame_ms = (samples.len() as u64 * 1000) / sample_rate as u64;
                let frame = CaptureFrame {
                    samples,
                    sample_rate,
                    timestamp_ms: elapsed_ms,
                };
                elapsed_ms += frame_ms;
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
        });

        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "fixture"
    }
}
