//! Playback engine
//!
//! Owns the player state and drives the audio sink. All mutation goes
//! through engine methods so the state has a single writer; sink callbacks
//! arrive on an event channel pumped by one task, and any event carrying a
//! generation older than the latest load is discarded.

use crate::events::{EventBus, RadioEvent};
use crate::models::Track;
use crate::playback::crossfade::{CrossfadePlan, STEP_INTERVAL};
use crate::playback::sink::{AudioSink, SinkEvent, SinkEventKind};
use crate::playback::state::{PlayerSnapshot, PlayerState};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Playback state machine
pub struct PlaybackEngine {
    state: RwLock<PlayerState>,
    sink: Arc<dyn AudioSink>,
    bus: EventBus,
    /// Stamp of the most recent load; sink events with an older stamp are
    /// from a superseded track and must not touch state
    generation: AtomicU64,
    /// Set while a crossfade ramp owns the gain control
    crossfading: AtomicBool,
    /// Last whole second broadcast as progress, to throttle SSE traffic
    last_progress_second: AtomicI64,
    crossfade_seconds: f64,
    pump: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackEngine {
    /// Create the engine and spawn the sink event pump
    pub fn new(
        sink: Arc<dyn AudioSink>,
        events: mpsc::UnboundedReceiver<SinkEvent>,
        bus: EventBus,
        crossfade_seconds: f64,
    ) -> Arc<Self> {
        let engine = Arc::new(Self {
            state: RwLock::new(PlayerState::new()),
            sink,
            bus,
            generation: AtomicU64::new(0),
            crossfading: AtomicBool::new(false),
            last_progress_second: AtomicI64::new(-1),
            crossfade_seconds,
            pump: std::sync::Mutex::new(None),
        });

        // The pump holds only a weak handle; a strong one would keep the
        // engine alive through its own sink's sender and it could never
        // be dropped
        let pump_engine = Arc::downgrade(&engine);
        let handle = tokio::spawn(Self::pump_events(pump_engine, events));
        *engine.pump.lock().unwrap() = Some(handle);

        engine
    }

    async fn pump_events(engine: Weak<Self>, mut events: mpsc::UnboundedReceiver<SinkEvent>) {
        while let Some(event) = events.recv().await {
            let Some(engine) = engine.upgrade() else {
                break;
            };
            let current = engine.generation.load(Ordering::Acquire);
            if event.generation != current {
                debug!(
                    "Dropping stale sink event (generation {} != {})",
                    event.generation, current
                );
                continue;
            }
            engine.handle_sink_event(event.kind).await;
        }
    }

    async fn handle_sink_event(&self, kind: SinkEventKind) {
        match kind {
            SinkEventKind::MetadataLoaded { duration } => {
                let (track_id, resume) = {
                    let mut state = self.state.write().await;
                    state.duration = duration;
                    state.current_time = 0.0;
                    state.is_loading = false;
                    state.current_track = state.queue.current().cloned();
                    (
                        state.current_track.as_ref().map(|t| t.id),
                        state.is_playing,
                    )
                };
                // Resume only if the user was already playing; loading a
                // queue never starts playback by itself
                if resume {
                    self.sink.play();
                }
                if let Some(track_id) = track_id {
                    info!("Track {} loaded ({:.1}s)", track_id, duration);
                    self.bus.broadcast(RadioEvent::TrackLoaded {
                        track_id,
                        duration,
                        timestamp: chrono::Utc::now(),
                    });
                }
            }
            SinkEventKind::Position { seconds } => {
                let (track_id, duration) = {
                    let mut state = self.state.write().await;
                    state.current_time = seconds;
                    (
                        state.current_track.as_ref().map(|t| t.id),
                        state.duration,
                    )
                };
                let second = seconds.floor() as i64;
                let previous = self.last_progress_second.swap(second, Ordering::AcqRel);
                if second != previous {
                    if let Some(track_id) = track_id {
                        self.bus.broadcast(RadioEvent::PlaybackProgress {
                            track_id,
                            position: seconds,
                            duration,
                            timestamp: chrono::Utc::now(),
                        });
                    }
                }
            }
            SinkEventKind::Ended => {
                debug!("Track ended, advancing");
                self.play_next().await;
            }
            SinkEventKind::Failed { message } => {
                warn!("Playback failed: {}", message);
                {
                    let mut state = self.state.write().await;
                    state.is_loading = false;
                    state.is_playing = false;
                    state.last_error = Some(message.clone());
                }
                self.bus.broadcast(RadioEvent::TrackFailed {
                    message,
                    timestamp: chrono::Utc::now(),
                });
            }
        }
    }

    /// Start loading the queue's current track under a fresh generation.
    /// Caller holds the state lock.
    fn load_current(&self, state: &mut PlayerState) {
        let Some((title, audio_url, advisory)) = state
            .queue
            .current()
            .map(|t| (t.title.clone(), t.audio_url.clone(), t.duration))
        else {
            return;
        };
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.last_progress_second.store(-1, Ordering::Release);
        state.is_loading = true;
        state.last_error = None;
        state.current_time = 0.0;
        state.duration = 0.0;
        debug!("Loading '{}' (generation {})", title, generation);
        self.sink.load(generation, &audio_url, advisory);
    }

    /// Replace the queue and start loading the track at `start_index`.
    /// An out-of-range index leaves no selection and loads nothing.
    pub async fn set_queue(&self, tracks: Vec<Track>, start_index: usize) {
        let (queue_len, current_index) = {
            let mut state = self.state.write().await;
            state.queue.replace(tracks, start_index);
            if state.queue.current().is_some() {
                self.load_current(&mut state);
            } else {
                // Invalidate any in-flight load so its events are dropped
                self.generation.fetch_add(1, Ordering::AcqRel);
                state.current_track = None;
                state.is_playing = false;
                state.is_loading = false;
                state.current_time = 0.0;
                state.duration = 0.0;
                self.sink.pause();
            }
            (state.queue.len(), state.queue.current_index())
        };
        self.bus.broadcast(RadioEvent::QueueChanged {
            queue_len,
            current_index,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Flip play/pause. No-op when nothing is selected.
    pub async fn toggle_play(&self) {
        let playing = {
            let mut state = self.state.write().await;
            if state.queue.current().is_none() {
                return;
            }
            state.is_playing = !state.is_playing;
            state.is_playing
        };
        if playing {
            self.sink.play();
        } else {
            self.sink.pause();
        }
        self.bus.broadcast(RadioEvent::PlaybackStateChanged {
            playing,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Advance to the next track, wrapping at the end of the queue
    pub async fn play_next(&self) {
        self.step(true).await;
    }

    /// Go back to the previous track, wrapping before the start
    pub async fn play_previous(&self) {
        self.step(false).await;
    }

    async fn step(&self, forward: bool) {
        let changed = {
            let mut state = self.state.write().await;
            let moved = if forward {
                state.queue.advance().is_some()
            } else {
                state.queue.retreat().is_some()
            };
            if moved {
                self.load_current(&mut state);
            }
            moved.then(|| (state.queue.len(), state.queue.current_index()))
        };
        if let Some((queue_len, current_index)) = changed {
            self.bus.broadcast(RadioEvent::QueueChanged {
                queue_len,
                current_index,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    /// Seek to an absolute position, clamped to the known duration
    pub async fn seek(&self, seconds: f64) {
        let clamped = {
            let mut state = self.state.write().await;
            if state.current_track.is_none() {
                return;
            }
            let clamped = if state.duration > 0.0 {
                seconds.clamp(0.0, state.duration)
            } else {
                seconds.max(0.0)
            };
            state.current_time = clamped;
            clamped
        };
        self.sink.set_position(clamped);
    }

    /// Set the user volume, clamped to 0.0..=1.0. During a crossfade the
    /// ramp keeps ownership of the gain and restores to the new volume when
    /// it completes.
    pub async fn set_volume(&self, volume: f32) {
        let clamped = volume.clamp(0.0, 1.0);
        {
            let mut state = self.state.write().await;
            state.volume = clamped;
        }
        self.sink.set_volume(clamped);
        if !self.crossfading.load(Ordering::Acquire) {
            self.sink.set_gain(clamped);
        }
        self.bus.broadcast(RadioEvent::VolumeChanged {
            volume: clamped,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Smoothly transition to the next track: ramp the gain down over half
    /// the crossfade window, advance the queue, and ramp back up to the
    /// user volume over the full window. While paused there is nothing
    /// audible to fade, so this degrades to a plain skip; a request during
    /// an active ramp is absorbed by it.
    pub async fn crossfade_to_next(self: Arc<Self>) {
        let playing = self.state.read().await.is_playing;
        if !playing {
            self.play_next().await;
            return;
        }
        if self.crossfading.swap(true, Ordering::AcqRel) {
            return;
        }

        let engine = Arc::clone(&self);
        tokio::spawn(async move {
            let volume = engine.state.read().await.volume;
            let plan = CrossfadePlan::new(engine.crossfade_seconds);

            for step in 1..=plan.fade_out_steps {
                tokio::time::sleep(STEP_INTERVAL).await;
                engine.sink.set_gain(plan.fade_out_gain(volume, step));
            }

            engine.play_next().await;

            for step in 1..=plan.fade_in_steps {
                tokio::time::sleep(STEP_INTERVAL).await;
                engine.sink.set_gain(plan.fade_in_gain(volume, step));
            }

            // The user may have changed volume mid-fade; land on the
            // latest value
            let volume = engine.state.read().await.volume;
            engine.sink.set_gain(volume);
            engine.crossfading.store(false, Ordering::Release);
        });
    }

    /// Point-in-time snapshot of the player state
    pub async fn snapshot(&self) -> PlayerSnapshot {
        self.state.read().await.snapshot()
    }

    /// Stop the event pump and release the sink
    pub fn shutdown(&self) {
        self.sink.close();
        if let Some(handle) = self.pump.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        if let Some(handle) = self.pump.lock().unwrap().take() {
            handle.abort();
        }
    }
}
