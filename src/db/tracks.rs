//! Track table access
//!
//! Catalog queries: list with genre/mood filters (newest first), fetch by id,
//! create/update/delete, play count increments, and the stale-track sweep
//! used by the cleanup job.

use crate::error::Result;
use crate::models::{Genre, Mood, Track};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

const TRACK_COLUMNS: &str = "id, title, artist, album, genre, mood, audio_url, cover_url, \
     duration, play_count, ai_generated, ai_prompt, ai_model, tags, bpm, musical_key, created_at";

/// Raw track row; text taxonomy and JSON tags decoded in `into_track`
#[derive(Debug, sqlx::FromRow)]
struct TrackRow {
    id: String,
    title: String,
    artist: String,
    album: Option<String>,
    genre: String,
    mood: String,
    audio_url: String,
    cover_url: Option<String>,
    duration: Option<f64>,
    play_count: i64,
    ai_generated: bool,
    ai_prompt: Option<String>,
    ai_model: Option<String>,
    tags: String,
    bpm: Option<i64>,
    musical_key: Option<String>,
    created_at: DateTime<Utc>,
}

impl TrackRow {
    fn into_track(self) -> Track {
        let id = Uuid::parse_str(&self.id).unwrap_or_else(|_| {
            warn!("Invalid track id in database: {}", self.id);
            Uuid::nil()
        });
        let tags: Vec<String> = serde_json::from_str(&self.tags).unwrap_or_default();

        Track {
            id,
            title: self.title,
            artist: self.artist,
            album: self.album,
            genre: Genre::parse(&self.genre),
            mood: Mood::parse(&self.mood),
            audio_url: self.audio_url,
            cover_url: self.cover_url,
            duration: self.duration,
            play_count: self.play_count,
            ai_generated: self.ai_generated,
            ai_prompt: self.ai_prompt,
            ai_model: self.ai_model,
            tags,
            bpm: self.bpm,
            musical_key: self.musical_key,
            created_at: self.created_at,
        }
    }
}

/// List tracks newest first, optionally filtered by genre and mood
pub async fn list_tracks(
    pool: &SqlitePool,
    genre: Option<Genre>,
    mood: Option<Mood>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Track>> {
    let sql = format!(
        "SELECT {TRACK_COLUMNS} FROM tracks \
         WHERE (?1 IS NULL OR genre = ?1) AND (?2 IS NULL OR mood = ?2) \
         ORDER BY created_at DESC LIMIT ?3 OFFSET ?4"
    );
    let rows = sqlx::query_as::<_, TrackRow>(&sql)
        .bind(genre.map(|g| g.as_str()))
        .bind(mood.map(|m| m.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    debug!("Listed {} tracks", rows.len());
    Ok(rows.into_iter().map(TrackRow::into_track).collect())
}

/// Fetch a single track by id
pub async fn get_track(pool: &SqlitePool, id: Uuid) -> Result<Option<Track>> {
    let sql = format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?");
    let row = sqlx::query_as::<_, TrackRow>(&sql)
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    Ok(row.map(TrackRow::into_track))
}

/// Insert a new track record
pub async fn insert_track(pool: &SqlitePool, track: &Track) -> Result<()> {
    let tags = serde_json::to_string(&track.tags).unwrap_or_else(|_| "[]".to_string());

    sqlx::query(
        r#"
        INSERT INTO tracks (
            id, title, artist, album, genre, mood, audio_url, cover_url,
            duration, play_count, ai_generated, ai_prompt, ai_model, tags,
            bpm, musical_key, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(track.id.to_string())
    .bind(&track.title)
    .bind(&track.artist)
    .bind(&track.album)
    .bind(track.genre.as_str())
    .bind(track.mood.as_str())
    .bind(&track.audio_url)
    .bind(&track.cover_url)
    .bind(track.duration)
    .bind(track.play_count)
    .bind(track.ai_generated)
    .bind(&track.ai_prompt)
    .bind(&track.ai_model)
    .bind(tags)
    .bind(track.bpm)
    .bind(&track.musical_key)
    .bind(track.created_at)
    .execute(pool)
    .await?;

    debug!("Inserted track {} ({})", track.id, track.title);
    Ok(())
}

/// Rewrite the mutable fields of an existing track record
pub async fn update_track(pool: &SqlitePool, track: &Track) -> Result<bool> {
    let tags = serde_json::to_string(&track.tags).unwrap_or_else(|_| "[]".to_string());

    let result = sqlx::query(
        r#"
        UPDATE tracks SET
            title = ?, artist = ?, album = ?, genre = ?, mood = ?,
            cover_url = ?, duration = ?, tags = ?, bpm = ?, musical_key = ?
        WHERE id = ?
        "#,
    )
    .bind(&track.title)
    .bind(&track.artist)
    .bind(&track.album)
    .bind(track.genre.as_str())
    .bind(track.mood.as_str())
    .bind(&track.cover_url)
    .bind(track.duration)
    .bind(tags)
    .bind(track.bpm)
    .bind(&track.musical_key)
    .bind(track.id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a track record; returns false when the id was unknown
pub async fn delete_track(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Increment a track's play count; returns false when the id was unknown
pub async fn increment_play_count(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("UPDATE tracks SET play_count = play_count + 1 WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// AI-generated tracks older than `created_before` with fewer plays than
/// `max_play_count`, oldest first, capped at `limit`. Cleanup candidates.
pub async fn stale_generated_tracks(
    pool: &SqlitePool,
    created_before: DateTime<Utc>,
    max_play_count: i64,
    limit: i64,
) -> Result<Vec<Track>> {
    let sql = format!(
        "SELECT {TRACK_COLUMNS} FROM tracks \
         WHERE ai_generated = 1 AND created_at < ? AND play_count < ? \
         ORDER BY created_at ASC LIMIT ?"
    );
    let rows = sqlx::query_as::<_, TrackRow>(&sql)
        .bind(created_before)
        .bind(max_play_count)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(TrackRow::into_track).collect())
}
