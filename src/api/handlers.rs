//! HTTP request handlers
//!
//! Catalog CRUD, likes, listening history, content generation, and
//! scheduler control. User identity is the `X-User-Id` header; read
//! endpoints degrade to anonymous defaults without it, write endpoints
//! reject with 401.

use crate::api::AppContext;
use crate::db;
use crate::error::{Error, Result};
use crate::events::RadioEvent;
use crate::generate::{cover, GenerationRequest};
use crate::models::{Genre, Mood, Track};
use crate::storage::BlobKind;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Header carrying the caller's identity
const USER_ID_HEADER: &str = "x-user-id";

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 200;
const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MIN_GENERATED_SECONDS: u32 = 10;
const MAX_GENERATED_SECONDS: u32 = 600;

/// Upload cap, matching the blob provider's per-file limit
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const AUDIO_EXTENSIONS: [&str; 4] = ["wav", "mp3", "ogg", "flac"];

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TrackListQuery {
    genre: Option<String>,
    mood: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTrackRequest {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    genre: Option<String>,
    mood: Option<String>,
    audio_url: Option<String>,
    cover_url: Option<String>,
    duration: Option<f64>,
    #[serde(default)]
    tags: Vec<String>,
    bpm: Option<i64>,
    musical_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTrackRequest {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    genre: Option<String>,
    mood: Option<String>,
    cover_url: Option<String>,
    duration: Option<f64>,
    tags: Option<Vec<String>>,
    bpm: Option<i64>,
    musical_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlayCountResponse {
    status: String,
    play_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct LikeStatusQuery {
    track_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct LikeToggleRequest {
    track_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    liked: bool,
    likes: i64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryRecordRequest {
    track_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    prompt: Option<String>,
    genre: Option<String>,
    mood: Option<String>,
    duration: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SchedulerStartRequest {
    interval_minutes: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SchedulerResponse {
    active: bool,
}

// ============================================================================
// Helpers
// ============================================================================

/// Caller identity from the `X-User-Id` header, if present and non-empty
fn user_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Caller identity, required
fn require_user(headers: &HeaderMap) -> Result<String> {
    user_id(headers).ok_or(Error::Unauthorized)
}

fn parse_genre(value: &str) -> Result<Genre> {
    Genre::parse_strict(value)
        .ok_or_else(|| Error::BadRequest(format!("Unknown genre: {}", value)))
}

fn parse_mood(value: &str) -> Result<Mood> {
    Mood::parse_strict(value).ok_or_else(|| Error::BadRequest(format!("Unknown mood: {}", value)))
}

fn required_field(value: Option<String>, name: &str) -> Result<String> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        return Err(Error::BadRequest(format!("Missing required field: {}", name)));
    }
    Ok(value)
}

async fn track_or_404(ctx: &AppContext, id: Uuid) -> Result<Track> {
    db::tracks::get_track(&ctx.db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Track {}", id)))
}

// ============================================================================
// Catalog Endpoints
// ============================================================================

/// GET /api/tracks - list tracks, newest first, with optional filters
pub async fn list_tracks(
    State(ctx): State<AppContext>,
    Query(query): Query<TrackListQuery>,
) -> Result<Json<Vec<Track>>> {
    let genre = query.genre.as_deref().map(parse_genre).transpose()?;
    let mood = query.mood.as_deref().map(parse_mood).transpose()?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let tracks = db::tracks::list_tracks(&ctx.db, genre, mood, limit, offset).await?;
    Ok(Json(tracks))
}

/// POST /api/tracks - register a track already present in media storage
pub async fn create_track(
    State(ctx): State<AppContext>,
    Json(request): Json<CreateTrackRequest>,
) -> Result<(StatusCode, Json<Track>)> {
    let title = required_field(request.title, "title")?;
    let artist = required_field(request.artist, "artist")?;
    let audio_url = required_field(request.audio_url, "audio_url")?;

    // Unknown taxonomy values fall into Other rather than failing the upload
    let genre = request
        .genre
        .as_deref()
        .map(Genre::parse)
        .unwrap_or(Genre::Other);
    let mood = request
        .mood
        .as_deref()
        .map(Mood::parse)
        .unwrap_or(Mood::Other);

    let track = Track {
        id: Uuid::new_v4(),
        title,
        artist,
        album: request.album,
        genre,
        mood,
        audio_url,
        cover_url: request.cover_url,
        duration: request.duration,
        play_count: 0,
        ai_generated: false,
        ai_prompt: None,
        ai_model: None,
        tags: request.tags,
        bpm: request.bpm,
        musical_key: request.musical_key,
        created_at: chrono::Utc::now(),
    };

    db::tracks::insert_track(&ctx.db, &track).await?;
    info!("Created track {} ({})", track.id, track.title);

    ctx.bus.broadcast(RadioEvent::TrackAdded {
        track: track.clone(),
        timestamp: chrono::Utc::now(),
    });

    Ok((StatusCode::CREATED, Json(track)))
}

/// POST /api/tracks/upload - multipart upload of a user-supplied audio
/// file. Stores the payload in the blob store, renders a cover from the
/// genre theme, and inserts the catalog row.
pub async fn upload_track(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Track>)> {
    let mut audio: Option<(String, Vec<u8>)> = None;
    let mut title = None;
    let mut artist = None;
    let mut album = None;
    let mut genre = None;
    let mut mood = None;
    let mut duration = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let extension = field
                    .file_name()
                    .and_then(|n| n.rsplit('.').next())
                    .map(str::to_ascii_lowercase)
                    .unwrap_or_default();
                if !AUDIO_EXTENSIONS.contains(&extension.as_str()) {
                    return Err(Error::BadRequest(format!(
                        "Unsupported audio format: {:?} (expected one of {:?})",
                        extension, AUDIO_EXTENSIONS
                    )));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::BadRequest(format!("Failed to read audio: {}", e)))?;
                if bytes.len() > MAX_UPLOAD_BYTES {
                    return Err(Error::BadRequest(format!(
                        "Audio file exceeds the {} MB limit",
                        MAX_UPLOAD_BYTES / (1024 * 1024)
                    )));
                }
                audio = Some((extension, bytes.to_vec()));
            }
            "title" => title = Some(field.text().await.unwrap_or_default()),
            "artist" => artist = Some(field.text().await.unwrap_or_default()),
            "album" => album = Some(field.text().await.unwrap_or_default()),
            "genre" => genre = Some(field.text().await.unwrap_or_default()),
            "mood" => mood = Some(field.text().await.unwrap_or_default()),
            "duration" => {
                duration = field.text().await.ok().and_then(|v| v.parse::<f64>().ok());
            }
            // Unknown form fields are ignored
            _ => {}
        }
    }

    let (extension, bytes) = audio
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| Error::BadRequest("Missing audio file".to_string()))?;
    let title = required_field(title, "title")?;
    let artist = artist
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| "Unknown Artist".to_string());
    let genre = genre.as_deref().map(Genre::parse).unwrap_or(Genre::Other);
    let mood = mood.as_deref().map(Mood::parse).unwrap_or(Mood::Other);

    let id = Uuid::new_v4();
    let audio_url = ctx
        .store
        .put(BlobKind::Audio, &format!("{}.{}", id, extension), &bytes)
        .await?;
    let svg = cover::render_cover(&title, &artist, genre.theme());
    let cover_url = ctx
        .store
        .put(BlobKind::Cover, &format!("{}.svg", id), svg.as_bytes())
        .await?;

    let track = Track {
        id,
        title,
        artist,
        album: album.filter(|a| !a.trim().is_empty()),
        genre,
        mood,
        audio_url,
        cover_url: Some(cover_url),
        duration,
        play_count: 0,
        ai_generated: false,
        ai_prompt: None,
        ai_model: None,
        tags: Vec::new(),
        bpm: None,
        musical_key: None,
        created_at: chrono::Utc::now(),
    };

    db::tracks::insert_track(&ctx.db, &track).await?;
    info!(
        "Uploaded track {} ({}, {} bytes)",
        track.id,
        track.title,
        bytes.len()
    );

    ctx.bus.broadcast(RadioEvent::TrackAdded {
        track: track.clone(),
        timestamp: chrono::Utc::now(),
    });

    Ok((StatusCode::CREATED, Json(track)))
}

/// GET /api/tracks/:id
pub async fn get_track(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Track>> {
    Ok(Json(track_or_404(&ctx, id).await?))
}

/// PUT /api/tracks/:id - partial update of mutable metadata
pub async fn update_track(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTrackRequest>,
) -> Result<Json<Track>> {
    let mut track = track_or_404(&ctx, id).await?;

    if let Some(title) = request.title {
        track.title = required_field(Some(title), "title")?;
    }
    if let Some(artist) = request.artist {
        track.artist = required_field(Some(artist), "artist")?;
    }
    if let Some(album) = request.album {
        track.album = Some(album);
    }
    if let Some(genre) = request.genre.as_deref() {
        track.genre = parse_genre(genre)?;
    }
    if let Some(mood) = request.mood.as_deref() {
        track.mood = parse_mood(mood)?;
    }
    if let Some(cover_url) = request.cover_url {
        track.cover_url = Some(cover_url);
    }
    if let Some(duration) = request.duration {
        track.duration = Some(duration);
    }
    if let Some(tags) = request.tags {
        track.tags = tags;
    }
    if let Some(bpm) = request.bpm {
        track.bpm = Some(bpm);
    }
    if let Some(musical_key) = request.musical_key {
        track.musical_key = Some(musical_key);
    }

    if !db::tracks::update_track(&ctx.db, &track).await? {
        return Err(Error::NotFound(format!("Track {}", id)));
    }
    Ok(Json(track))
}

/// DELETE /api/tracks/:id - remove the record and its media blobs
pub async fn delete_track(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let track = track_or_404(&ctx, id).await?;

    // Blob deletes are best effort; the record is the source of truth
    if let Err(e) = ctx.store.delete(&track.audio_url).await {
        warn!("Failed to delete audio blob for {}: {}", id, e);
    }
    if let Some(cover_url) = &track.cover_url {
        if let Err(e) = ctx.store.delete(cover_url).await {
            warn!("Failed to delete cover blob for {}: {}", id, e);
        }
    }

    db::tracks::delete_track(&ctx.db, id).await?;
    info!("Deleted track {} ({})", id, track.title);

    ctx.bus.broadcast(RadioEvent::TrackDeleted {
        track_id: id,
        timestamp: chrono::Utc::now(),
    });

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tracks/:id/play - bump the play counter; identified callers
/// also get a listening-history row
pub async fn record_play(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayCountResponse>> {
    if !db::tracks::increment_play_count(&ctx.db, id).await? {
        return Err(Error::NotFound(format!("Track {}", id)));
    }
    if let Some(user) = user_id(&headers) {
        db::history::record_listen(&ctx.db, &user, id).await?;
    }
    let track = track_or_404(&ctx, id).await?;
    Ok(Json(PlayCountResponse {
        status: "ok".to_string(),
        play_count: track.play_count,
    }))
}

// ============================================================================
// Likes Endpoints
// ============================================================================

/// GET /api/likes?track_id= - like state for the caller plus total count.
/// Anonymous callers always see `liked: false`.
pub async fn like_status(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Query(query): Query<LikeStatusQuery>,
) -> Result<Json<LikeResponse>> {
    track_or_404(&ctx, query.track_id).await?;

    let liked = match user_id(&headers) {
        Some(user) => db::likes::is_liked(&ctx.db, &user, query.track_id).await?,
        None => false,
    };
    let likes = db::likes::like_count(&ctx.db, query.track_id).await?;

    Ok(Json(LikeResponse { liked, likes }))
}

/// POST /api/likes - toggle the caller's like on a track
pub async fn toggle_like(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(request): Json<LikeToggleRequest>,
) -> Result<Json<LikeResponse>> {
    let user = require_user(&headers)?;
    track_or_404(&ctx, request.track_id).await?;

    let liked = db::likes::toggle_like(&ctx.db, &user, request.track_id).await?;
    let likes = db::likes::like_count(&ctx.db, request.track_id).await?;

    Ok(Json(LikeResponse { liked, likes }))
}

// ============================================================================
// History Endpoints
// ============================================================================

/// GET /api/history - the caller's recent listens, newest first.
/// Anonymous callers get an empty list.
pub async fn list_history(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<db::history::HistoryEntry>>> {
    let Some(user) = user_id(&headers) else {
        return Ok(Json(Vec::new()));
    };
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_PAGE_SIZE);

    let entries = db::history::recent_listens(&ctx.db, &user, limit).await?;
    Ok(Json(entries))
}

/// POST /api/history - record that the caller listened to a track
pub async fn record_history(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(request): Json<HistoryRecordRequest>,
) -> Result<StatusCode> {
    let user = require_user(&headers)?;
    track_or_404(&ctx, request.track_id).await?;

    db::history::record_listen(&ctx.db, &user, request.track_id).await?;
    Ok(StatusCode::CREATED)
}

// ============================================================================
// Generation Endpoints
// ============================================================================

/// POST /api/generate - synthesize one placeholder track on demand
pub async fn generate_track(
    State(ctx): State<AppContext>,
    Json(request): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<Track>)> {
    let genre = request
        .genre
        .as_deref()
        .map(parse_genre)
        .transpose()?
        .unwrap_or(Genre::LoFi);
    let mood = request
        .mood
        .as_deref()
        .map(parse_mood)
        .transpose()?
        .unwrap_or(Mood::Chill);
    let duration = request
        .duration
        .unwrap_or(ctx.config.generated_duration_seconds)
        .clamp(MIN_GENERATED_SECONDS, MAX_GENERATED_SECONDS);
    let prompt = request
        .prompt
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| format!("{} {} track", mood, genre));

    let track = ctx
        .generator
        .generate(GenerationRequest {
            prompt,
            genre,
            mood,
            duration,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(track)))
}

// ============================================================================
// Scheduler Endpoints
// ============================================================================

/// POST /api/scheduler/start
pub async fn scheduler_start(
    State(ctx): State<AppContext>,
    request: Option<Json<SchedulerStartRequest>>,
) -> Result<Json<SchedulerResponse>> {
    let interval = request
        .and_then(|Json(r)| r.interval_minutes)
        .unwrap_or(ctx.config.scheduler_interval_minutes);
    if interval == 0 {
        return Err(Error::BadRequest(
            "interval_minutes must be positive".to_string(),
        ));
    }

    ctx.scheduler.start(interval);
    Ok(Json(SchedulerResponse {
        active: ctx.scheduler.is_active(),
    }))
}

/// POST /api/scheduler/stop
pub async fn scheduler_stop(State(ctx): State<AppContext>) -> Result<Json<SchedulerResponse>> {
    ctx.scheduler.stop();
    Ok(Json(SchedulerResponse {
        active: ctx.scheduler.is_active(),
    }))
}

/// GET /api/scheduler/status
pub async fn scheduler_status(State(ctx): State<AppContext>) -> Json<SchedulerResponse> {
    Json(SchedulerResponse {
        active: ctx.scheduler.is_active(),
    })
}
