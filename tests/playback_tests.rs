// Tests for the gapless playback scheduler.
//
// A manual-clock sink records every begin/stop decision so the scheduling
// rules can be asserted exactly.

use std::sync::{Arc, Mutex};
use vibeflow_hub::audio::{PlaybackScheduler, PlaybackSink, SourceId};

const RATE: u32 = 24000;

#[derive(Debug, Default)]
struct SinkLog {
    begun: Vec<(SourceId, usize, f64)>,
    stopped: Vec<SourceId>,
}

struct ManualSink {
    clock: Arc<Mutex<f64>>,
    log: Arc<Mutex<SinkLog>>,
    next_id: SourceId,
}

impl ManualSink {
    fn new() -> (Self, Arc<Mutex<f64>>, Arc<Mutex<SinkLog>>) {
        let clock = Arc::new(Mutex::new(0.0));
        let log = Arc::new(Mutex::new(SinkLog::default()));
        (
            Self {
                clock: clock.clone(),
                log: log.clone(),
                next_id: 0,
            },
            clock,
            log,
        )
    }
}

impl PlaybackSink for ManualSink {
    fn now(&self) -> f64 {
        *self.clock.lock().unwrap()
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

fn fragment(secs: f64) -> Vec<f32> {
    vec![0.0; (secs * RATE as f64) as usize]
}

#[test]
fn test_gapless_concatenation() {
    let (sink, _clock, log) = ManualSink::new();
    let mut scheduler = PlaybackScheduler::new(Box::new(sink));

    // d1=0.1, d2=0.2, d3=0.1: each starts where the previous ends
    let s1 = scheduler.schedule(fragment(0.1), RATE);
    let s2 = scheduler.schedule(fragment(0.2), RATE);
    let s3 = scheduler.schedule(fragment(0.1), RATE);

    assert_eq!(s1, 0.0);
    assert!((s2 - 0.1).abs() < 1e-9);
    assert!((s3 - 0.3).abs() < 1e-9);
    assert!((scheduler.next_start() - 0.4).abs() < 1e-9);

    let log = log.lock().unwrap();
    assert_eq!(log.begun.len(), 3);
    assert!(log.stopped.is_empty());
}

#[test]
fn test_arrival_behind_clock_starts_now() {
    let (sink, clock, _log) = ManualSink::new();
    let mut scheduler = PlaybackScheduler::new(Box::new(sink));

    scheduler.schedule(fragment(0.1), RATE);

    // The queue drained and the clock moved past next_start
    *clock.lock().unwrap() = 0.5;

    let start = scheduler.schedule(fragment(0.1), RATE);
    assert!((start - 0.5).abs() < 1e-9);
    assert!((scheduler.next_start() - 0.6).abs() < 1e-9);
}

#[test]
fn test_flush_stops_everything_and_resets() {
    let (sink, clock, log) = ManualSink::new();
    let mut scheduler = PlaybackScheduler::new(Box::new(sink));

    scheduler.schedule(fragment(0.1), RATE);
    scheduler.schedule(fragment(0.1), RATE);
    assert_eq!(scheduler.pending(), 2);

    scheduler.flush();

    assert_eq!(scheduler.pending(), 0);
    assert_eq!(scheduler.next_start(), 0.0);
    {
        let log = log.lock().unwrap();
        assert_eq!(log.stopped, vec![0, 1]);
    }

    // After an interrupt the next fragment starts at/after the clock,
    // regardless of the previously accumulated next_start
    *clock.lock().unwrap() = 0.7;
    let start = scheduler.schedule(fragment(0.1), RATE);
    assert!((start - 0.7).abs() < 1e-9);
}

#[test]
fn test_flush_on_empty_scheduler_is_harmless() {
    let (sink, _clock, log) = ManualSink::new();
    let mut scheduler = PlaybackScheduler::new(Box::new(sink));

    scheduler.flush();
    scheduler.flush();

    assert_eq!(scheduler.pending(), 0);
    assert!(log.lock().unwrap().stopped.is_empty());
}

#[test]
fn test_finished_sources_are_pruned_not_stopped() {
    let (sink, clock, log) = ManualSink::new();
    let mut scheduler = PlaybackScheduler::new(Box::new(sink));

    scheduler.schedule(fragment(0.1), RATE);

    // Clock passes the fragment's end; the next schedule drops the tracking
    // entry without stopping a source that already finished
    *clock.lock().unwrap() = 0.5;
    scheduler.schedule(fragment(0.1), RATE);

    assert_eq!(scheduler.pending(), 1);
    assert!(log.lock().unwrap().stopped.is_empty());
}
