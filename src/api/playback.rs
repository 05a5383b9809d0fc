//! Playback control handlers
//!
//! Thin HTTP veneer over the playback engine. Every mutation returns the
//! resulting player snapshot so clients never need a follow-up read.

use crate::api::AppContext;
use crate::db;
use crate::error::{Error, Result};
use crate::playback::PlayerSnapshot;
use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SetQueueRequest {
    track_ids: Vec<Uuid>,
    #[serde(default)]
    start_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    position: f64,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    volume: f32,
}

/// POST /api/playback/queue - replace the queue with catalog tracks
pub async fn set_queue(
    State(ctx): State<AppContext>,
    Json(request): Json<SetQueueRequest>,
) -> Result<Json<PlayerSnapshot>> {
    let mut tracks = Vec::with_capacity(request.track_ids.len());
    for id in &request.track_ids {
        let track = db::tracks::get_track(&ctx.db, *id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Track {}", id)))?;
        tracks.push(track);
    }

    ctx.engine.set_queue(tracks, request.start_index).await;
    Ok(Json(ctx.engine.snapshot().await))
}

/// POST /api/playback/toggle
pub async fn toggle_play(State(ctx): State<AppContext>) -> Json<PlayerSnapshot> {
    ctx.engine.toggle_play().await;
    Json(ctx.engine.snapshot().await)
}

/// POST /api/playback/next
pub async fn play_next(State(ctx): State<AppContext>) -> Json<PlayerSnapshot> {
    ctx.engine.play_next().await;
    Json(ctx.engine.snapshot().await)
}

/// POST /api/playback/previous
pub async fn play_previous(State(ctx): State<AppContext>) -> Json<PlayerSnapshot> {
    ctx.engine.play_previous().await;
    Json(ctx.engine.snapshot().await)
}

/// POST /api/playback/seek
pub async fn seek(
    State(ctx): State<AppContext>,
    Json(request): Json<SeekRequest>,
) -> Result<Json<PlayerSnapshot>> {
    if !request.position.is_finite() {
        return Err(Error::BadRequest("position must be finite".to_string()));
    }
    ctx.engine.seek(request.position).await;
    Ok(Json(ctx.engine.snapshot().await))
}

/// POST /api/playback/volume
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Json(request): Json<VolumeRequest>,
) -> Result<Json<PlayerSnapshot>> {
    if !request.volume.is_finite() {
        return Err(Error::BadRequest("volume must be finite".to_string()));
    }
    ctx.engine.set_volume(request.volume).await;
    Ok(Json(ctx.engine.snapshot().await))
}

/// POST /api/playback/crossfade - smooth skip to the next track
pub async fn crossfade_to_next(State(ctx): State<AppContext>) -> Json<PlayerSnapshot> {
    std::sync::Arc::clone(&ctx.engine).crossfade_to_next().await;
    Json(ctx.engine.snapshot().await)
}

/// GET /api/playback/state
pub async fn get_state(State(ctx): State<AppContext>) -> Json<PlayerSnapshot> {
    Json(ctx.engine.snapshot().await)
}
