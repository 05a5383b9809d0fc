//! Audio sink abstraction
//!
//! The engine drives playback through a small trait so the real audio
//! backend is swappable. Every load is stamped with a monotonically
//! increasing generation; the sink echoes that generation on every event
//! it emits, and the engine drops events whose generation is stale. That
//! is the whole defense against callbacks from a superseded load racing a
//! newer one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// How often `ClockSink` reports playback position
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Event payload from the sink
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEventKind {
    /// Track metadata is ready; playback may begin
    MetadataLoaded { duration: f64 },
    /// Playback position advanced
    Position { seconds: f64 },
    /// The current track played to its end
    Ended,
    /// The load or playback failed
    Failed { message: String },
}

/// Generation-stamped sink event
#[derive(Debug, Clone, PartialEq)]
pub struct SinkEvent {
    pub generation: u64,
    pub kind: SinkEventKind,
}

/// Channel the sink reports events on
pub type SinkEventSender = mpsc::UnboundedSender<SinkEvent>;

/// Playback backend contract
///
/// Methods are synchronous and must not block: implementations hand work
/// to their own tasks and report outcomes through the event channel.
pub trait AudioSink: Send + Sync {
    /// Begin loading `audio_url` under `generation`. Any in-flight load is
    /// superseded. `advisory_duration` is the catalog's duration hint for
    /// backends that cannot derive one themselves.
    fn load(&self, generation: u64, audio_url: &str, advisory_duration: Option<f64>);

    /// Start or resume audible output
    fn play(&self);

    /// Pause audible output, keeping position
    fn pause(&self);

    /// Jump to an absolute position in seconds
    fn set_position(&self, seconds: f64);

    /// User-facing volume, 0.0 to 1.0
    fn set_volume(&self, volume: f32);

    /// Ramp gain applied on top of volume during crossfades
    fn set_gain(&self, gain: f32);

    /// Release the sink and stop emitting events
    fn close(&self);
}

#[derive(Debug)]
struct ClockState {
    generation: u64,
    duration: f64,
    position: f64,
    playing: bool,
    loaded: bool,
}

/// Clock-driven sink that simulates playback timing without decoding
/// audio. Position advances on a wall-clock ticker while "playing"; when
/// it reaches the advisory duration the sink reports `Ended`.
pub struct ClockSink {
    state: Arc<Mutex<ClockState>>,
    events: SinkEventSender,
    closed: Arc<AtomicBool>,
}

impl ClockSink {
    /// Create the sink and spawn its ticker task. Events flow into
    /// `events` until `close` is called.
    pub fn new(events: SinkEventSender) -> Self {
        let state = Arc::new(Mutex::new(ClockState {
            generation: 0,
            duration: 0.0,
            position: 0.0,
            playing: false,
            loaded: false,
        }));
        let closed = Arc::new(AtomicBool::new(false));

        let tick_state = Arc::clone(&state);
        let tick_closed = Arc::clone(&closed);
        let tick_events = events.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(TICK_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if tick_closed.load(Ordering::Acquire) {
                    break;
                }
                let event = {
                    let mut state = tick_state.lock().unwrap();
                    if !state.playing || !state.loaded {
                        continue;
                    }
                    state.position += TICK_INTERVAL.as_secs_f64();
                    if state.duration > 0.0 && state.position >= state.duration {
                        state.position = state.duration;
                        state.playing = false;
                        SinkEvent {
                            generation: state.generation,
                            kind: SinkEventKind::Ended,
                        }
                    } else {
                        SinkEvent {
                            generation: state.generation,
                            kind: SinkEventKind::Position {
                                seconds: state.position,
                            },
                        }
                    }
                };
                if tick_events.send(event).is_err() {
                    break;
                }
            }
        });

        Self {
            state,
            events,
            closed,
        }
    }
}

impl AudioSink for ClockSink {
    fn load(&self, generation: u64, audio_url: &str, advisory_duration: Option<f64>) {
        debug!("Loading {} (generation {})", audio_url, generation);
        let duration = advisory_duration.unwrap_or(0.0).max(0.0);
        {
            let mut state = self.state.lock().unwrap();
            state.generation = generation;
            state.duration = duration;
            state.position = 0.0;
            state.loaded = true;
        }
        // Metadata is immediate here; a decoding backend would report it
        // asynchronously once headers are parsed
        let _ = self.events.send(SinkEvent {
            generation,
            kind: SinkEventKind::MetadataLoaded { duration },
        });
    }

    fn play(&self) {
        let mut state = self.state.lock().unwrap();
        if state.loaded {
            state.playing = true;
        }
    }

    fn pause(&self) {
        self.state.lock().unwrap().playing = false;
    }

    fn set_position(&self, seconds: f64) {
        let mut state = self.state.lock().unwrap();
        let clamped = if state.duration > 0.0 {
            seconds.clamp(0.0, state.duration)
        } else {
            seconds.max(0.0)
        };
        state.position = clamped;
    }

    fn set_volume(&self, _volume: f32) {}

    fn set_gain(&self, _gain: f32) {}

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.state.lock().unwrap().playing = false;
    }
}
