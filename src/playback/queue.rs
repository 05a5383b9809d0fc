//! In-memory play queue
//!
//! Ordered sequence of tracks plus a cursor. The cursor is `None` (no
//! selection) or a valid index; navigation wraps in both directions and is
//! a no-op only on an empty queue.

use crate::models::Track;

/// Ordered playlist with a current-position cursor
#[derive(Debug, Clone, Default)]
pub struct PlayQueue {
    tracks: Vec<Track>,
    position: Option<usize>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue wholesale. The cursor lands on `start_index` when
    /// valid, otherwise there is no selection (and nothing to load).
    pub fn replace(&mut self, tracks: Vec<Track>, start_index: usize) {
        self.position = if start_index < tracks.len() {
            Some(start_index)
        } else {
            None
        };
        self.tracks = tracks;
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&Track> {
        self.position.and_then(|i| self.tracks.get(i))
    }

    /// Cursor position, `-1` when nothing is selected
    pub fn current_index(&self) -> i64 {
        self.position.map(|i| i as i64).unwrap_or(-1)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Move the cursor forward, wrapping past the end; returns the new
    /// current track. No-op only on an empty queue.
    pub fn advance(&mut self) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }
        self.position = Some(match self.position {
            Some(i) if i + 1 < self.tracks.len() => i + 1,
            _ => 0,
        });
        self.current()
    }

    /// Move the cursor backward, wrapping before the start; returns the new
    /// current track. No-op only on an empty queue.
    pub fn retreat(&mut self) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }
        self.position = Some(match self.position {
            Some(i) if i > 0 => i - 1,
            _ => self.tracks.len() - 1,
        });
        self.current()
    }
}
