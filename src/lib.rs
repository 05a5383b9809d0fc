//! # NeuroRadio
//!
//! AI-themed web radio service: a track catalog with likes, listening
//! history, and play counts; a placeholder content generator with a
//! background scheduler; and a playback engine with a wrapping queue,
//! timed crossfades, and stale-callback suppression, all exposed over a
//! REST/SSE interface.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod generate;
pub mod models;
pub mod playback;
pub mod scheduler;
pub mod storage;

pub use error::{Error, Result};
