use super::stats::{LiveStats, SessionState};
use crate::audio::{
    pcm, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource, PlaybackScheduler,
    PlaybackSink,
};
use crate::config::AudioConfig;
use crate::error::Result;
use crate::remote::{RemoteServiceClient, VoiceEvent, VoiceSession};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// A live bidirectional voice conversation.
///
/// Owns every ambient resource of the session exclusively: the capture
/// backend, the playback scheduler, and the transport handle. Lifecycle is
/// Idle → Starting → Live → Idle; `stop` is idempotent and safe from any
/// state, and a failed `start` fully unwinds before reporting the error.
///
/// At most one session is active: starting while one is live tears the
/// existing one down first.
pub struct LiveSession {
    /// Capture/playback rates and frame size
    audio: AudioConfig,

    /// Remote service used to open the voice transport
    client: Arc<dyn RemoteServiceClient>,

    /// Where capture frames come from on the next start
    capture_source: CaptureSource,

    /// Serializes start/stop so the whole transition (teardown through
    /// pipeline wiring) is exclusive
    transition: Arc<Mutex<()>>,

    /// Lifecycle state
    state: Arc<Mutex<SessionState>>,

    /// Liveness flag the streaming tasks poll
    is_live: Arc<AtomicBool>,

    /// When the current session went live
    started_at: Arc<Mutex<Option<chrono::DateTime<Utc>>>>,

    /// Capture backend for the active session
    backend: Arc<Mutex<Option<Box<dyn CaptureBackend>>>>,

    /// Outbound half of the voice transport
    voice: Arc<Mutex<Option<Arc<dyn VoiceSession>>>>,

    /// Gapless output scheduling (fragments and barge-in flushes)
    scheduler: Arc<Mutex<PlaybackScheduler>>,

    /// Handle for the capture pipeline task
    capture_task: Arc<Mutex<Option<JoinHandle<()>>>>,

    /// Handle for the transport event task
    event_task: Arc<Mutex<Option<JoinHandle<()>>>>,

    /// Capture frames sent so far
    frames_sent: Arc<AtomicUsize>,

    /// Response fragments scheduled so far
    fragments_scheduled: Arc<AtomicUsize>,
}

impl LiveSession {
    pub fn new(
        audio: AudioConfig,
        client: Arc<dyn RemoteServiceClient>,
        capture_source: CaptureSource,
        sink: Box<dyn PlaybackSink>,
    ) -> Self {
        Self {
            audio,
            client,
            capture_source,
            transition: Arc::new(Mutex::new(())),
            state: Arc::new(Mutex::new(SessionState::Idle)),
            is_live: Arc::new(AtomicBool::new(false)),
            started_at: Arc::new(Mutex::new(None)),
            backend: Arc::new(Mutex::new(None)),
            voice: Arc::new(Mutex::new(None)),
            scheduler: Arc::new(Mutex::new(PlaybackScheduler::new(sink))),
            capture_task: Arc::new(Mutex::new(None)),
            event_task: Arc::new(Mutex::new(None)),
            frames_sent: Arc::new(AtomicUsize::new(0)),
            fragments_scheduled: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Start a live session.
    ///
    /// Tears down any existing session first, acquires the capture device,
    /// opens the voice transport, and wires the capture and playback
    /// pipelines. On any failure everything acquired so far is released and
    /// the state returns to Idle.
    pub async fn start(&self) -> Result<()> {
        // Held until the new session is fully wired (or unwound), so a
        // concurrent start or stop cannot interleave with the transition
        // and leak the previous session's transport or tasks.
        let _transition = self.transition.lock().await;

        if *self.state.lock().await != SessionState::Idle {
            warn!("Live session already active, restarting");
            self.stop_inner().await?;
        }

        *self.state.lock().await = SessionState::Starting;
        info!("Starting live session");

        match self.start_inner().await {
            Ok(()) => {
                *self.state.lock().await = SessionState::Live;
                *self.started_at.lock().await = Some(Utc::now());
                info!("Live session started");
                Ok(())
            }
            Err(e) => {
                warn!("Live session failed to start: {}", e);
                self.stop_inner().await?;
                Err(e)
            }
        }
    }

    async fn start_inner(&self) -> Result<()> {
        let capture_config = CaptureConfig {
            sample_rate: self.audio.capture_rate,
            frame_samples: self.audio.frame_samples,
        };

        let mut backend =
            CaptureBackendFactory::create(self.capture_source.clone(), capture_config)?;

        let mut frames = backend.start().await?;

        let (voice, mut events) = match self.client.open_voice_session().await {
            Ok(opened) => opened,
            Err(e) => {
                // unwind the half-open session before reporting
                let _ = backend.stop().await;
                return Err(e);
            }
        };

        let voice: Arc<dyn VoiceSession> = Arc::from(voice);

        *self.backend.lock().await = Some(backend);
        *self.voice.lock().await = Some(Arc::clone(&voice));
        self.frames_sent.store(0, Ordering::SeqCst);
        self.fragments_scheduled.store(0, Ordering::SeqCst);
        self.is_live.store(true, Ordering::SeqCst);

        // Capture pipeline: float frames -> 16-bit PCM -> session, one send
        // per filled buffer, fire-and-forget.
        let is_live = Arc::clone(&self.is_live);
        let frames_sent = Arc::clone(&self.frames_sent);

        let capture_task = tokio::spawn(async move {
            while let Some(frame) = frames.recv().await {
                if !is_live.load(Ordering::SeqCst) {
                    break;
                }

                let bytes = pcm::f32_to_pcm_bytes(&frame.samples);
                if let Err(e) = voice.send_frame(&bytes).await {
                    warn!("Failed to send capture frame: {}", e);
                    continue;
                }

                frames_sent.fetch_add(1, Ordering::SeqCst);
            }

            info!("Capture pipeline stopped");
        });

        // Transport events: fragments and interrupts arrive on one channel
        // and are handled by this single task, so a flush can never race a
        // fragment that was decoded before the interrupt.
        let is_live = Arc::clone(&self.is_live);
        let scheduler = Arc::clone(&self.scheduler);
        let fragments_scheduled = Arc::clone(&self.fragments_scheduled);
        let playback_rate = self.audio.playback_rate;

        let event_task = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if !is_live.load(Ordering::SeqCst) {
                    break;
                }

                match event {
                    VoiceEvent::AudioFragment(bytes) => {
                        let samples = pcm::pcm_bytes_to_f32(&bytes);
                        let mut scheduler = scheduler.lock().await;
                        scheduler.schedule(samples, playback_rate);
                        fragments_scheduled.fetch_add(1, Ordering::SeqCst);
                    }
                    VoiceEvent::Interrupted => {
                        info!("Barge-in: flushing queued playback");
                        scheduler.lock().await.flush();
                    }
                    VoiceEvent::Closed => break,
                }
            }

            info!("Event pipeline stopped");
        });

        *self.capture_task.lock().await = Some(capture_task);
        *self.event_task.lock().await = Some(event_task);

        Ok(())
    }

    /// Stop the session and release every acquired resource.
    ///
    /// Idempotent: safe to call twice, from any state, or before a start
    /// ever happened.
    pub async fn stop(&self) -> Result<()> {
        let _transition = self.transition.lock().await;
        self.stop_inner().await
    }

    async fn stop_inner(&self) -> Result<()> {
        self.is_live.store(false, Ordering::SeqCst);

        if let Some(voice) = self.voice.lock().await.take() {
            if let Err(e) = voice.close().await {
                warn!("Failed to close voice session: {}", e);
            }
        }

        if let Some(mut backend) = self.backend.lock().await.take() {
            if let Err(e) = backend.stop().await {
                warn!("Failed to stop capture backend: {}", e);
            }
        }

        // The transport and device are gone; the pipeline tasks are only
        // waiting on closed channels now.
        if let Some(task) = self.capture_task.lock().await.take() {
            task.abort();
            let _ = task.await;
        }
        if let Some(task) = self.event_task.lock().await.take() {
            task.abort();
            let _ = task.await;
        }

        self.scheduler.lock().await.flush();

        let mut state = self.state.lock().await;
        if *state != SessionState::Idle {
            info!("Live session stopped");
        }
        *state = SessionState::Idle;
        *self.started_at.lock().await = None;

        Ok(())
    }

    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// Get current session statistics
    pub async fn stats(&self) -> LiveStats {
        LiveStats {
            state: *self.state.lock().await,
            started_at: *self.started_at.lock().await,
            frames_sent: self.frames_sent.load(Ordering::SeqCst),
            fragments_scheduled: self.fragments_scheduled.load(Ordering::SeqCst),
            pending_playback: self.scheduler.lock().await.pending(),
        }
    }
}
