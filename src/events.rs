//! Event types and broadcast bus
//!
//! Events are broadcast via `EventBus` and serialized for SSE transmission.
//! All components publish through the central enum for exhaustive matching.

use crate::models::Track;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Service-wide event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RadioEvent {
    /// Playback state changed (Playing <-> Paused)
    PlaybackStateChanged {
        playing: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track finished loading and became current
    TrackLoaded {
        track_id: Uuid,
        duration: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track load or decode failed
    TrackFailed {
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Periodic playback progress update (SSE only, never persisted)
    PlaybackProgress {
        track_id: Uuid,
        position: f64,
        duration: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Queue contents or cursor changed
    QueueChanged {
        queue_len: usize,
        current_index: i64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Volume changed (user scale 0.0-1.0)
    VolumeChanged {
        volume: f32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track was added to the catalog (upload or generation)
    TrackAdded {
        track: Track,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track was removed from the catalog
    TrackDeleted {
        track_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Background scheduler started or stopped
    SchedulerStateChanged {
        active: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl RadioEvent {
    /// Event type string for the SSE `event:` field
    pub fn type_str(&self) -> &'static str {
        match self {
            RadioEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            RadioEvent::TrackLoaded { .. } => "TrackLoaded",
            RadioEvent::TrackFailed { .. } => "TrackFailed",
            RadioEvent::PlaybackProgress { .. } => "PlaybackProgress",
            RadioEvent::QueueChanged { .. } => "QueueChanged",
            RadioEvent::VolumeChanged { .. } => "VolumeChanged",
            RadioEvent::TrackAdded { .. } => "TrackAdded",
            RadioEvent::TrackDeleted { .. } => "TrackDeleted",
            RadioEvent::SchedulerStateChanged { .. } => "SchedulerStateChanged",
        }
    }
}

/// Broadcast bus for service events
///
/// Cloning shares the underlying channel. Sends are best-effort: with no
/// subscribers the event is dropped silently.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RadioEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RadioEvent> {
        self.tx.subscribe()
    }

    pub fn broadcast(&self, event: RadioEvent) {
        // Err means no active subscribers, which is fine
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
