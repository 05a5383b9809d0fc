//! Playback engine behavior tests
//!
//! Drives the engine through a scripted fake sink so queue navigation,
//! volume handling, stale-callback suppression, and crossfade completion
//! can be asserted without any audio backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use neuroradio::events::EventBus;
use neuroradio::models::{Genre, Mood, Track};
use neuroradio::playback::{AudioSink, PlaybackEngine, SinkEvent, SinkEventKind};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Scripted sink that records every engine call. With `auto_metadata` it
/// answers each load with an immediate `MetadataLoaded`, otherwise the
/// test sends sink events by hand.
struct FakeSink {
    events: mpsc::UnboundedSender<SinkEvent>,
    auto_metadata: bool,
    loads: Mutex<Vec<(u64, String)>>,
    playing: AtomicBool,
    volume: Mutex<f32>,
    gain: Mutex<f32>,
    positions: Mutex<Vec<f64>>,
}

impl FakeSink {
    fn new(events: mpsc::UnboundedSender<SinkEvent>, auto_metadata: bool) -> Arc<Self> {
        Arc::new(Self {
            events,
            auto_metadata,
            loads: Mutex::new(Vec::new()),
            playing: AtomicBool::new(false),
            volume: Mutex::new(1.0),
            gain: Mutex::new(1.0),
            positions: Mutex::new(Vec::new()),
        })
    }

    fn load_count(&self) -> usize {
        self.loads.lock().unwrap().len()
    }

    fn last_generation(&self) -> u64 {
        self.loads.lock().unwrap().last().map(|(g, _)| *g).unwrap()
    }

    fn send(&self, generation: u64, kind: SinkEventKind) {
        self.events.send(SinkEvent { generation, kind }).unwrap();
    }

    fn gain(&self) -> f32 {
        *self.gain.lock().unwrap()
    }
}

impl AudioSink for FakeSink {
    fn load(&self, generation: u64, audio_url: &str, advisory_duration: Option<f64>) {
        self.loads
            .lock()
            .unwrap()
            .push((generation, audio_url.to_string()));
        if self.auto_metadata {
            self.send(
                generation,
                SinkEventKind::MetadataLoaded {
                    duration: advisory_duration.unwrap_or(42.0),
                },
            );
        }
    }

    fn play(&self) {
        self.playing.store(true, Ordering::SeqCst);
    }

    fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn set_position(&self, seconds: f64) {
        self.positions.lock().unwrap().push(seconds);
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock().unwrap() = volume;
    }

    fn set_gain(&self, gain: f32) {
        *self.gain.lock().unwrap() = gain;
    }

    fn close(&self) {}
}

fn track(title: &str, duration: f64) -> Track {
    Track {
        id: Uuid::new_v4(),
        title: title.to_string(),
        artist: "Test".to_string(),
        album: None,
        genre: Genre::LoFi,
        mood: Mood::Chill,
        audio_url: format!("/media/audio/{}.wav", title),
        cover_url: None,
        duration: Some(duration),
        play_count: 0,
        ai_generated: false,
        ai_prompt: None,
        ai_model: None,
        tags: Vec::new(),
        bpm: None,
        musical_key: None,
        created_at: chrono::Utc::now(),
    }
}

fn tracks(n: usize) -> Vec<Track> {
    (0..n).map(|i| track(&format!("t{}", i), 30.0)).collect()
}

fn setup(auto_metadata: bool) -> (Arc<PlaybackEngine>, Arc<FakeSink>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = FakeSink::new(tx, auto_metadata);
    let engine = PlaybackEngine::new(
        Arc::clone(&sink) as Arc<dyn AudioSink>,
        rx,
        EventBus::default(),
        3.0,
    );
    (engine, sink)
}

/// Let the engine's event pump drain pending sink events
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_set_queue_loads_start_track() {
    let (engine, sink) = setup(true);

    engine.set_queue(tracks(3), 0).await;
    settle().await;

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.current_index, 0);
    assert_eq!(snapshot.current_track.as_ref().unwrap().title, "t0");
    assert_eq!(snapshot.duration, 30.0);
    assert!(!snapshot.is_loading);
    // Loading a queue never starts playback by itself
    assert!(!snapshot.is_playing);
    assert_eq!(sink.load_count(), 1);
}

#[tokio::test]
async fn test_empty_queue_loads_nothing() {
    let (engine, sink) = setup(true);

    engine.set_queue(Vec::new(), 0).await;
    settle().await;

    let snapshot = engine.snapshot().await;
    assert!(snapshot.current_track.is_none());
    assert_eq!(snapshot.current_index, -1);
    assert_eq!(sink.load_count(), 0);
}

#[tokio::test]
async fn test_out_of_range_start_index_leaves_no_selection() {
    let (engine, sink) = setup(true);

    engine.set_queue(tracks(3), 9).await;
    settle().await;

    let snapshot = engine.snapshot().await;
    assert!(snapshot.current_track.is_none());
    assert_eq!(snapshot.current_index, -1);
    assert_eq!(sink.load_count(), 0);
}

#[tokio::test]
async fn test_toggle_without_selection_is_noop() {
    let (engine, sink) = setup(true);

    engine.toggle_play().await;
    settle().await;

    assert!(!engine.snapshot().await.is_playing);
    assert!(!sink.playing.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_toggle_flips_playing() {
    let (engine, sink) = setup(true);
    engine.set_queue(tracks(2), 0).await;
    settle().await;

    engine.toggle_play().await;
    assert!(engine.snapshot().await.is_playing);
    assert!(sink.playing.load(Ordering::SeqCst));

    engine.toggle_play().await;
    assert!(!engine.snapshot().await.is_playing);
    assert!(!sink.playing.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_next_wraps_around_queue() {
    let (engine, _sink) = setup(true);
    engine.set_queue(tracks(3), 0).await;
    settle().await;

    let mut seen = Vec::new();
    for _ in 0..3 {
        engine.play_next().await;
        settle().await;
        seen.push(engine.snapshot().await.current_index);
    }
    assert_eq!(seen, vec![1, 2, 0]);
}

#[tokio::test]
async fn test_previous_from_first_wraps_to_last() {
    let (engine, _sink) = setup(true);
    engine.set_queue(tracks(4), 0).await;
    settle().await;

    engine.play_previous().await;
    settle().await;

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.current_index, 3);
    assert_eq!(snapshot.current_track.unwrap().title, "t3");
}

#[tokio::test]
async fn test_volume_clamps_to_unit_range() {
    let (engine, sink) = setup(true);

    engine.set_volume(-0.3).await;
    assert_eq!(engine.snapshot().await.volume, 0.0);

    engine.set_volume(1.7).await;
    assert_eq!(engine.snapshot().await.volume, 1.0);
    assert_eq!(*sink.volume.lock().unwrap(), 1.0);
}

#[tokio::test]
async fn test_mute_toggle_restores_volume() {
    let (engine, _sink) = setup(true);

    assert_eq!(engine.snapshot().await.volume, 0.8);
    engine.set_volume(0.0).await;
    assert_eq!(engine.snapshot().await.volume, 0.0);
    engine.set_volume(0.8).await;
    assert_eq!(engine.snapshot().await.volume, 0.8);
}

#[tokio::test]
async fn test_seek_clamps_to_duration() {
    let (engine, sink) = setup(true);
    engine.set_queue(tracks(1), 0).await;
    settle().await;

    engine.seek(500.0).await;
    assert_eq!(engine.snapshot().await.current_time, 30.0);

    engine.seek(-5.0).await;
    assert_eq!(engine.snapshot().await.current_time, 0.0);

    assert_eq!(*sink.positions.lock().unwrap(), vec![30.0, 0.0]);
}

#[tokio::test]
async fn test_stale_metadata_is_suppressed() {
    let (engine, sink) = setup(false);

    engine.set_queue(tracks(3), 0).await;
    let first_generation = sink.last_generation();

    // A skip supersedes the first load before its metadata arrives
    engine.play_next().await;
    let second_generation = sink.last_generation();
    assert!(second_generation > first_generation);

    sink.send(
        first_generation,
        SinkEventKind::MetadataLoaded { duration: 99.0 },
    );
    settle().await;

    let snapshot = engine.snapshot().await;
    assert!(snapshot.is_loading);
    assert_eq!(snapshot.duration, 0.0);
    assert!(snapshot.current_track.is_none());

    sink.send(
        second_generation,
        SinkEventKind::MetadataLoaded { duration: 30.0 },
    );
    settle().await;

    let snapshot = engine.snapshot().await;
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.duration, 30.0);
    assert_eq!(snapshot.current_track.unwrap().title, "t1");
}

#[tokio::test]
async fn test_stale_position_is_suppressed() {
    let (engine, sink) = setup(false);

    engine.set_queue(tracks(2), 0).await;
    let first_generation = sink.last_generation();
    engine.play_next().await;

    sink.send(first_generation, SinkEventKind::Position { seconds: 17.0 });
    settle().await;

    assert_eq!(engine.snapshot().await.current_time, 0.0);
}

#[tokio::test]
async fn test_failed_load_records_error_and_stops() {
    let (engine, sink) = setup(false);

    engine.set_queue(tracks(1), 0).await;
    sink.send(
        sink.last_generation(),
        SinkEventKind::Failed {
            message: "decode error".to_string(),
        },
    );
    settle().await;

    let snapshot = engine.snapshot().await;
    assert!(!snapshot.is_playing);
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.last_error.as_deref(), Some("decode error"));

    // The next load clears the error
    engine.play_next().await;
    assert!(engine.snapshot().await.last_error.is_none());
}

#[tokio::test]
async fn test_ended_advances_to_next_track() {
    let (engine, sink) = setup(true);
    engine.set_queue(tracks(2), 0).await;
    settle().await;

    sink.send(sink.last_generation(), SinkEventKind::Ended);
    settle().await;

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.current_index, 1);
    assert_eq!(snapshot.current_track.unwrap().title, "t1");
}

#[tokio::test]
async fn test_dropping_last_handle_releases_engine() {
    let (engine, sink) = setup(true);
    engine.set_queue(tracks(1), 0).await;
    settle().await;

    // The event pump must not keep the engine alive once the last
    // external handle is gone
    let weak = Arc::downgrade(&engine);
    drop(engine);
    settle().await;
    assert!(weak.upgrade().is_none());

    // The sink outlives the engine without panicking
    sink.play();
}

#[tokio::test(start_paused = true)]
async fn test_crossfade_advances_and_restores_volume() {
    let (engine, sink) = setup(true);
    engine.set_queue(tracks(2), 0).await;
    settle().await;
    engine.toggle_play().await;

    Arc::clone(&engine).crossfade_to_next().await;
    // Paused time auto-advances through the ramp's sleeps
    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.current_index, 1);
    assert!(snapshot.is_playing);
    assert_eq!(sink.gain(), 0.8);
}

#[tokio::test(start_paused = true)]
async fn test_crossfade_while_paused_is_plain_skip() {
    let (engine, sink) = setup(true);
    engine.set_queue(tracks(3), 0).await;
    settle().await;

    Arc::clone(&engine).crossfade_to_next().await;
    settle().await;

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.current_index, 1);
    // No ramp ran, so the gain was never touched
    assert_eq!(sink.gain(), 1.0);
}

#[tokio::test(start_paused = true)]
async fn test_volume_change_during_crossfade_lands_after_ramp() {
    let (engine, sink) = setup(true);
    engine.set_queue(tracks(2), 0).await;
    settle().await;
    engine.toggle_play().await;

    Arc::clone(&engine).crossfade_to_next().await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    engine.set_volume(0.5).await;

    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;

    // The ramp finishes on the updated user volume
    assert_eq!(sink.gain(), 0.5);
    assert_eq!(engine.snapshot().await.volume, 0.5);
}
