//! Content generation stub
//!
//! Stands in for real AI music generation: randomized metadata, a layered
//! sine WAV payload, and an SVG cover. Payloads go through the blob store,
//! metadata through the tracks table, and a `TrackAdded` event is broadcast.

pub mod audio;
pub mod cover;

use crate::error::Result;
use crate::events::{EventBus, RadioEvent};
use crate::models::{Genre, Mood, Track};
use crate::storage::{BlobKind, BlobStore};
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

/// Identifier recorded in `ai_model` for stub output
const STUB_MODEL: &str = "demo-ai";

/// Cleanup policy: AI tracks older than this, with fewer plays than this,
/// at most this many per sweep
const CLEANUP_AGE_DAYS: i64 = 30;
const CLEANUP_MAX_PLAYS: i64 = 5;
const CLEANUP_BATCH: i64 = 10;

const TITLE_SUFFIXES: [&str; 5] = ["Dreams", "Waves", "Harmony", "Echoes", "Signal"];
const ARTISTS: [&str; 5] = [
    "AI Composer",
    "Neural Network",
    "Digital Dreams",
    "Synthetic Soul",
    "Cyber Musician",
];
const ALBUMS: [&str; 5] = [
    "Digital Waves",
    "Neon Nights",
    "Cyber Dreams",
    "AI Sessions",
    "Neural Beats",
];
const KEYS: [&str; 7] = ["C", "D", "E", "F", "G", "A", "B"];

/// Parameters for one generation request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub genre: Genre,
    pub mood: Mood,
    /// Requested length in seconds
    pub duration: u32,
}

/// Placeholder content generator
#[derive(Clone)]
pub struct ContentGenerator {
    db: SqlitePool,
    store: BlobStore,
    bus: EventBus,
    default_duration: u32,
}

impl ContentGenerator {
    pub fn new(db: SqlitePool, store: BlobStore, bus: EventBus, default_duration: u32) -> Self {
        Self {
            db,
            store,
            bus,
            default_duration,
        }
    }

    /// Default request used by the background scheduler
    pub fn background_request(&self) -> GenerationRequest {
        let mut rng = rand::thread_rng();
        let genre = *Genre::ALL.choose(&mut rng).unwrap_or(&Genre::LoFi);
        GenerationRequest {
            prompt: "ambient background rotation".to_string(),
            genre,
            mood: Mood::Chill,
            duration: self.default_duration,
        }
    }

    /// Generate one placeholder track end to end
    pub async fn generate(&self, request: GenerationRequest) -> Result<Track> {
        let id = Uuid::new_v4();
        let (title, artist, album, bpm, musical_key) =
            random_metadata(request.genre, request.mood);

        info!(
            "Generating placeholder track {} ({} / {} / {}s)",
            id, request.genre, request.mood, request.duration
        );

        let wav = audio::synthesize_wav(request.duration, audio::key_frequency(&musical_key))?;
        let svg = cover::render_cover(&title, &artist, request.genre.theme());

        let audio_url = self
            .store
            .put(BlobKind::Audio, &format!("{}.wav", id), &wav)
            .await?;
        let cover_url = self
            .store
            .put(BlobKind::Cover, &format!("{}.svg", id), svg.as_bytes())
            .await?;

        let track = Track {
            id,
            title,
            artist,
            album: Some(album),
            genre: request.genre,
            mood: request.mood,
            audio_url,
            cover_url: Some(cover_url),
            duration: Some(request.duration as f64),
            play_count: 0,
            ai_generated: true,
            ai_prompt: Some(request.prompt),
            ai_model: Some(STUB_MODEL.to_string()),
            tags: vec![
                request.genre.as_str().to_string(),
                request.mood.as_str().to_string(),
            ],
            bpm: Some(bpm),
            musical_key: Some(musical_key),
            created_at: Utc::now(),
        };

        crate::db::tracks::insert_track(&self.db, &track).await?;

        self.bus.broadcast(RadioEvent::TrackAdded {
            track: track.clone(),
            timestamp: Utc::now(),
        });

        Ok(track)
    }

    /// Remove old, rarely played AI-generated tracks along with their blobs.
    /// Returns the number of tracks deleted.
    pub async fn cleanup_stale(&self) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(CLEANUP_AGE_DAYS);
        let stale = crate::db::tracks::stale_generated_tracks(
            &self.db,
            cutoff,
            CLEANUP_MAX_PLAYS,
            CLEANUP_BATCH,
        )
        .await?;

        let mut deleted = 0;
        for track in stale {
            // Blobs first so a failed delete leaves the row discoverable
            if let Err(e) = self.store.delete(&track.audio_url).await {
                warn!("Failed to delete audio blob for {}: {}", track.id, e);
                continue;
            }
            if let Some(cover_url) = &track.cover_url {
                if let Err(e) = self.store.delete(cover_url).await {
                    warn!("Failed to delete cover blob for {}: {}", track.id, e);
                }
            }

            if crate::db::tracks::delete_track(&self.db, track.id).await? {
                self.bus.broadcast(RadioEvent::TrackDeleted {
                    track_id: track.id,
                    timestamp: Utc::now(),
                });
                deleted += 1;
                info!("Cleaned up stale track {} ({})", track.id, track.title);
            }
        }

        Ok(deleted)
    }
}

fn random_metadata(genre: Genre, mood: Mood) -> (String, String, String, i64, String) {
    let mut rng = rand::thread_rng();

    // Title leads with the mood or genre, matching the stub's display style
    let lead = if rng.gen_bool(0.5) {
        capitalize(mood.as_str())
    } else {
        capitalize(genre.as_str())
    };
    let title = format!("{} {}", lead, TITLE_SUFFIXES.choose(&mut rng).unwrap());

    let artist = ARTISTS.choose(&mut rng).unwrap().to_string();
    let album = ALBUMS.choose(&mut rng).unwrap().to_string();
    let bpm = rng.gen_range(80..=120);
    let minor = if rng.gen_bool(0.5) { "m" } else { "" };
    let musical_key = format!("{}{}", KEYS.choose(&mut rng).unwrap(), minor);

    (title, artist, album, bpm, musical_key)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
