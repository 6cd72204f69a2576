use tracing::debug;

/// Opaque handle for a scheduled playback source.
pub type SourceId = u64;

/// Output-side audio primitive: an output clock plus the ability to begin a
/// sample buffer at a given clock time and to stop it early.
///
/// Implementations:
/// - Platform: OS audio output (not bundled; integration point for hosts)
/// - Null: discards audio, clock pinned to 0 (headless operation)
/// - Tests provide manual-clock sinks to assert scheduling decisions
pub trait PlaybackSink: Send {
    /// Current output clock time in seconds
    fn now(&self) -> f64;

    /// Begin playing `samples` at clock time `at`, returning a handle
    fn begin(&mut self, samples: Vec<f32>, sample_rate: u32, at: f64) -> SourceId;

    /// Stop a source before it finishes
    fn stop(&mut self, id: SourceId);
}

struct Scheduled {
    id: SourceId,
    ends_at: f64,
}

/// Gapless playback scheduler.
///
/// Fragments are scheduled in arrival order: each starts at
/// `max(next_start, now)` and advances `next_start` by its own duration, so
/// consecutive fragments concatenate without gaps. `flush` is the barge-in
/// path: every tracked source is stopped, the set is cleared, and
/// `next_start` resets to zero so the next fragment starts as soon as
/// possible.
pub struct PlaybackScheduler {
    sink: Box<dyn PlaybackSink>,
    next_start: f64,
    scheduled: Vec<Scheduled>,
}

impl PlaybackScheduler {
    pub fn new(sink: Box<dyn PlaybackSink>) -> Self {
        Self {
            sink,
            next_start: 0.0,
            scheduled: Vec::new(),
        }
    }

    /// Schedule one fragment for gapless playback. Returns its start time.
    pub fn schedule(&mut self, samples: Vec<f32>, sample_rate: u32) -> f64 {
        let now = self.sink.now();

        // Sources that already finished no longer need tracking
        self.scheduled.retain(|s| s.ends_at > now);

        let start = self.next_start.max(now);
        let duration = super::pcm::duration_secs(samples.len(), sample_rate);

        let id = self.sink.begin(samples, sample_rate, start);
        self.next_start = start + duration;
        self.scheduled.push(Scheduled {
            id,
            ends_at: self.next_start,
        });

        debug!(
            "Scheduled fragment: start={:.3}s dur={:.3}s pending={}",
            start,
            duration,
            self.scheduled.len()
        );

        start
    }

    /// Stop and forget every tracked source and reset the schedule clock.
    pub fn flush(&mut self) {
        for s in self.scheduled.drain(..) {
            self.sink.stop(s.id);
        }
        self.next_start = 0.0;
    }

    /// Number of sources still tracked (scheduled or playing).
    pub fn pending(&self) -> usize {
        self.scheduled.len()
    }

    /// Start time the next fragment would get if it arrived now.
    pub fn next_start(&self) -> f64 {
        self.next_start
    }
}

/// Discards audio; clock stays at zero. Placeholder until a platform
/// playback backend lands.
pub struct NullSink {
    next_id: SourceId,
}

impl NullSink {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSink for NullSink {
    fn now(&self) -> f64 {
        0.0
    }

    fn begin(&mut self, _samples: Vec<f32>, _sample_rate: u32, _at: f64) -> SourceId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn stop(&mut self, _id: SourceId) {}
}
