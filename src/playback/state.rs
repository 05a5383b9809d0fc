//! Playback state
//!
//! The engine is the single writer; the UI reads point-in-time snapshots.

use crate::models::Track;
use crate::playback::queue::PlayQueue;
use serde::Serialize;

/// Default volume for a fresh session
pub const DEFAULT_VOLUME: f32 = 0.8;

/// Mutable engine-owned state
#[derive(Debug, Default)]
pub struct PlayerState {
    pub queue: PlayQueue,
    pub current_track: Option<Track>,
    /// Audible intent, not "audio data has arrived"
    pub is_playing: bool,
    pub current_time: f64,
    /// 0.0 until the backend reports metadata
    pub duration: f64,
    pub volume: f32,
    /// True from load request until metadata is ready or an error occurs
    pub is_loading: bool,
    /// Most recent load/decode failure, cleared by the next load
    pub last_error: Option<String>,
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            ..Default::default()
        }
    }

    /// Point-in-time snapshot for the UI
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            current_track: self.current_track.clone(),
            is_playing: self.is_playing,
            current_time: self.current_time,
            duration: self.duration,
            volume: self.volume,
            queue: self.queue.tracks().to_vec(),
            current_index: self.queue.current_index(),
            is_loading: self.is_loading,
            last_error: self.last_error.clone(),
        }
    }
}

/// Observable playback snapshot
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub current_track: Option<Track>,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f32,
    pub queue: Vec<Track>,
    /// `-1` when nothing is selected
    pub current_index: i64,
    pub is_loading: bool,
    pub last_error: Option<String>,
}
