//! Database access layer
//!
//! Provides SQLite persistence for tracks, likes, and listening history.

pub mod history;
pub mod init;
pub mod likes;
pub mod tracks;

pub use init::init_database;
