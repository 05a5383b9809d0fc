//! Playback engine
//!
//! The core of the service: an ordered play queue with a cursor, a
//! state-machine engine driving an abstract audio sink, and timed
//! crossfade ramps. All backend callbacks are generation-tagged so events
//! from a superseded load can never mutate state for the current track.

pub mod crossfade;
pub mod engine;
pub mod queue;
pub mod sink;
pub mod state;

pub use engine::PlaybackEngine;
pub use queue::PlayQueue;
pub use sink::{AudioSink, ClockSink, SinkEvent, SinkEventKind};
pub use state::{PlayerSnapshot, PlayerState};
