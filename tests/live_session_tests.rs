// Tests for the live voice session: capture pipeline encoding, gapless
// fragment scheduling, barge-in flush, and lifecycle guarantees.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use vibeflow_hub::audio::pcm;
use vibeflow_hub::config::AudioConfig;
use vibeflow_hub::{
    AspectRatio, CaptureSource, ChatReply, HubError, ImageQuality, LiveSession, PlaybackSink,
    RemoteServiceClient, SessionState, SourceId, ToolConfig, VideoJobHandle, VideoJobStatus,
    VoiceEvent, VoiceSession,
};

// ============================================================================
// Mocks
// ============================================================================

/// Records frames sent over the session and whether it was closed.
struct ScriptedVoice {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    closed: Arc<AtomicBool>,
    closes: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl VoiceSession for ScriptedVoice {
    async fn send_frame(&self, frame: &[u8]) -> vibeflow_hub::Result<()> {
        self.sent.lock().unwrap().push(frame.to_vec());
        Ok(())
    }

    async fn close(&self) -> vibeflow_hub::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Remote client whose voice session is driven by the test: frames land in
/// `sent`, and the test pushes events through `events`.
struct VoiceMock {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    closed: Arc<AtomicBool>,
    closes: Arc<AtomicUsize>,
    events: Arc<Mutex<Option<mpsc::Sender<VoiceEvent>>>>,
    opens: AtomicUsize,
    fail_open: bool,
    open_delay: Option<Duration>,
}

impl VoiceMock {
    fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
            closes: Arc::new(AtomicUsize::new(0)),
            events: Arc::new(Mutex::new(None)),
            opens: AtomicUsize::new(0),
            fail_open: false,
            open_delay: None,
        }
    }

    fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::new()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            open_delay: Some(delay),
            ..Self::new()
        }
    }

    fn event_sender(&self) -> mpsc::Sender<VoiceEvent> {
        self.events
            .lock()
            .unwrap()
            .clone()
            .expect("no session opened yet")
    }
}

#[async_trait::async_trait]
impl RemoteServiceClient for VoiceMock {
    async fn chat_complete(
        &self,
        _message: &str,
        _tools: ToolConfig,
        _thinking_budget: Option<u32>,
    ) -> vibeflow_hub::Result<ChatReply> {
        Err(HubError::RemoteService("not part of this test".to_string()))
    }

    async fn generate_image(
        &self,
        _prompt: &str,
        _aspect_ratio: AspectRatio,
        _quality: ImageQuality,
    ) -> vibeflow_hub::Result<Vec<u8>> {
        Err(HubError::RemoteService("not part of this test".to_string()))
    }

    async fn edit_image(
        &self,
        _image: &[u8],
        _mime_type: &str,
        _instruction: &str,
    ) -> vibeflow_hub::Result<Vec<u8>> {
        Err(HubError::RemoteService("not part of this test".to_string()))
    }

    async fn analyze(
        &self,
        _media: &[u8],
        _mime_type: &str,
        _instruction: &str,
    ) -> vibeflow_hub::Result<String> {
        Err(HubError::RemoteService("not part of this test".to_string()))
    }

    async fn enhance_prompt(&self, _prompt: &str) -> vibeflow_hub::Result<String> {
        Err(HubError::RemoteService("not part of this test".to_string()))
    }

    async fn submit_video_job(
        &self,
        _prompt: &str,
        _seed_image: Option<&[u8]>,
        _aspect_ratio: AspectRatio,
    ) -> vibeflow_hub::Result<VideoJobHandle> {
        Err(HubError::RemoteService("not part of this test".to_string()))
    }

    async fn poll_video_job(
        &self,
        _job: &VideoJobHandle,
    ) -> vibeflow_hub::Result<VideoJobStatus> {
        Err(HubError::RemoteService("not part of this test".to_string()))
    }

    async fn fetch_video(&self, _uri: &str) -> vibeflow_hub::Result<Vec<u8>> {
        Err(HubError::RemoteService("not part of this test".to_string()))
    }

    async fn open_voice_session(
        &self,
    ) -> vibeflow_hub::Result<(Box<dyn VoiceSession>, mpsc::Receiver<VoiceEvent>)> {
        if self.fail_open {
            return Err(HubError::Transport("voice endpoint unreachable".to_string()));
        }

        if let Some(delay) = self.open_delay {
            tokio::time::sleep(delay).await;
        }

        self.opens.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(64);
        *self.events.lock().unwrap() = Some(tx);

        Ok((
            Box::new(ScriptedVoice {
                sent: Arc::clone(&self.sent),
                closed: Arc::clone(&self.closed),
                closes: Arc::clone(&self.closes),
            }),
            rx,
        ))
    }

    async fn synthesize_speech(&self, _text: &str) -> vibeflow_hub::Result<Vec<u8>> {
        Err(HubError::RemoteService("not part of this test".to_string()))
    }
}

#[derive(Debug, Default)]
struct SinkLog {
    begun: Vec<(SourceId, usize, f64)>,
    stopped: Vec<SourceId>,
}

struct SharedSink {
    log: Arc<Mutex<SinkLog>>,
    next_id: SourceId,
}

impl SharedSink {
    fn new() -> (Self, Arc<Mutex<SinkLog>>) {
        let log = Arc::new(Mutex::new(SinkLog::default()));
        (
            Self {
                log: log.clone(),
                next_id: 0,
            },
            log,
        )
    }
}

impl PlaybackSink for SharedSink {
    fn now(&self) -> f64 {
        0.0
    }

    fn begin(&mut self, samples: Vec<f32>, _sample_rate: u32, at: f64) -> SourceId {
        let id = self.next_id;
        self.next_id += 1;
        self.log.lock().unwrap().begun.push((id, samples.len(), at));
        id
    }

    fn stop(&mut self, id: SourceId) {
        self.log.lock().unwrap().stopped.push(id);
    }
}

fn session_with(
    client: Arc<VoiceMock>,
    frames: Vec<Vec<f32>>,
) -> (LiveSession, Arc<Mutex<SinkLog>>) {
    let (sink, log) = SharedSink::new();
    let session = LiveSession::new(
        AudioConfig::default(),
        client,
        CaptureSource::Fixture(frames),
        Box::new(sink),
    );
    (session, log)
}

async fn wait_until<F: Fn() -> bool>(what: &str, cond: F) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {}", what);
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_capture_frames_are_sent_as_pcm() {
    let client = Arc::new(VoiceMock::new());
    let frame = vec![0.5f32, -0.5, 0.25, -1.0];
    let (session, _log) = session_with(client.clone(), vec![frame.clone()]);

    session.start().await.unwrap();
    assert_eq!(session.state().await, SessionState::Live);

    let sent = Arc::clone(&client.sent);
    wait_until("capture frame", || !sent.lock().unwrap().is_empty()).await;

    let sent = sent.lock().unwrap();
    assert_eq!(sent[0], pcm::f32_to_pcm_bytes(&frame));

    drop(sent);
    session.stop().await.unwrap();
}

#[tokio::test]
async fn test_fragments_are_scheduled_gaplessly() {
    let client = Arc::new(VoiceMock::new());
    let (session, log) = session_with(client.clone(), vec![]);

    session.start().await.unwrap();

    // Two 0.1s fragments at the 24 kHz playback rate
    let fragment = pcm::i16_to_le_bytes(&vec![0i16; 2400]);
    let events = client.event_sender();
    events
        .send(VoiceEvent::AudioFragment(fragment.clone()))
        .await
        .unwrap();
    events
        .send(VoiceEvent::AudioFragment(fragment))
        .await
        .unwrap();

    let log_handle = Arc::clone(&log);
    wait_until("two scheduled fragments", || {
        log_handle.lock().unwrap().begun.len() == 2
    })
    .await;

    {
        let log = log.lock().unwrap();
        assert_eq!(log.begun[0].2, 0.0);
        assert!((log.begun[1].2 - 0.1).abs() < 1e-9);
    }

    let stats = session.stats().await;
    assert_eq!(stats.fragments_scheduled, 2);

    session.stop().await.unwrap();
}

#[tokio::test]
async fn test_interrupt_flushes_queued_playback() {
    let client = Arc::new(VoiceMock::new());
    let (session, log) = session_with(client.clone(), vec![]);

    session.start().await.unwrap();

    let fragment = pcm::i16_to_le_bytes(&vec![0i16; 2400]);
    let events = client.event_sender();
    events
        .send(VoiceEvent::AudioFragment(fragment.clone()))
        .await
        .unwrap();
    events
        .send(VoiceEvent::AudioFragment(fragment.clone()))
        .await
        .unwrap();
    events.send(VoiceEvent::Interrupted).await.unwrap();
    events
        .send(VoiceEvent::AudioFragment(fragment))
        .await
        .unwrap();

    let log_handle = Arc::clone(&log);
    wait_until("post-interrupt fragment", || {
        log_handle.lock().unwrap().begun.len() == 3
    })
    .await;

    let log = log.lock().unwrap();
    // The first two sources were stopped by the flush
    assert_eq!(log.stopped, vec![0, 1]);
    // The accumulated schedule was reset: the new fragment starts at the
    // clock (0.0), not at the 0.2s the first two had accumulated
    assert_eq!(log.begun[2].2, 0.0);

    drop(log);
    session.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_is_idempotent_from_any_state() {
    let client = Arc::new(VoiceMock::new());
    let (session, _log) = session_with(client.clone(), vec![]);

    // Never started
    session.stop().await.unwrap();
    session.stop().await.unwrap();
    assert_eq!(session.state().await, SessionState::Idle);

    // Started, then stopped twice
    session.start().await.unwrap();
    session.stop().await.unwrap();
    session.stop().await.unwrap();
    assert_eq!(session.state().await, SessionState::Idle);
    assert!(client.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_stop_flushes_playback() {
    let client = Arc::new(VoiceMock::new());
    let (session, log) = session_with(client.clone(), vec![]);

    session.start().await.unwrap();

    let fragment = pcm::i16_to_le_bytes(&vec![0i16; 2400]);
    client
        .event_sender()
        .send(VoiceEvent::AudioFragment(fragment))
        .await
        .unwrap();

    let log_handle = Arc::clone(&log);
    wait_until("scheduled fragment", || {
        !log_handle.lock().unwrap().begun.is_empty()
    })
    .await;

    session.stop().await.unwrap();

    assert_eq!(log.lock().unwrap().stopped, vec![0]);
    assert_eq!(session.stats().await.pending_playback, 0);
}

#[tokio::test]
async fn test_restart_tears_down_previous_session() {
    let client = Arc::new(VoiceMock::new());
    let (session, _log) = session_with(client.clone(), vec![]);

    session.start().await.unwrap();
    session.start().await.unwrap();

    assert_eq!(session.state().await, SessionState::Live);
    assert_eq!(client.opens.load(Ordering::SeqCst), 2);
    // The first session's transport was closed before the second opened
    assert!(client.closed.load(Ordering::SeqCst));

    session.stop().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_starts_keep_a_single_session() {
    // Opening the transport takes long enough that both starts are in
    // flight at once; the transitions must still serialize so exactly one
    // session survives and the other is torn down, not leaked.
    let client = Arc::new(VoiceMock::slow(Duration::from_millis(50)));
    let (session, _log) = session_with(client.clone(), vec![]);
    let session = Arc::new(session);

    let first = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.start().await }
    });
    let second = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.start().await }
    });

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert_eq!(session.state().await, SessionState::Live);
    assert_eq!(client.opens.load(Ordering::SeqCst), 2);
    // The later start closed the earlier transport before opening its own
    assert_eq!(client.closes.load(Ordering::SeqCst), 1);

    session.stop().await.unwrap();
    assert_eq!(client.closes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_transport_open_unwinds_to_idle() {
    let client = Arc::new(VoiceMock::failing());
    let (session, _log) = session_with(client.clone(), vec![]);

    let err = session.start().await.unwrap_err();

    assert!(matches!(err, HubError::Transport(_)));
    assert_eq!(session.state().await, SessionState::Idle);
    assert!(session.stats().await.started_at.is_none());
}

#[tokio::test]
async fn test_microphone_source_without_backend_reports_permission() {
    let client = Arc::new(VoiceMock::new());
    let (sink, _log) = SharedSink::new();
    let session = LiveSession::new(
        AudioConfig::default(),
        client,
        CaptureSource::Microphone,
        Box::new(sink),
    );

    let err = session.start().await.unwrap_err();

    assert!(matches!(err, HubError::Permission(_)));
    assert_eq!(session.state().await, SessionState::Idle);
}
