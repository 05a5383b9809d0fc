//! Likes table access
//!
//! Per-user like toggling. Last write wins; the unique (user_id, track_id)
//! constraint keeps at most one row per pair.

use crate::error::Result;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

/// Check whether the user has liked the track
pub async fn is_liked(pool: &SqlitePool, user_id: &str, track_id: Uuid) -> Result<bool> {
    let liked: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = ? AND track_id = ?)",
    )
    .bind(user_id)
    .bind(track_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(liked)
}

/// Toggle the user's like on a track; returns the new liked state
pub async fn toggle_like(pool: &SqlitePool, user_id: &str, track_id: Uuid) -> Result<bool> {
    if is_liked(pool, user_id, track_id).await? {
        sqlx::query("DELETE FROM likes WHERE user_id = ? AND track_id = ?")
            .bind(user_id)
            .bind(track_id.to_string())
            .execute(pool)
            .await?;

        debug!("User {} unliked track {}", user_id, track_id);
        Ok(false)
    } else {
        sqlx::query("INSERT INTO likes (id, user_id, track_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(track_id.to_string())
            .bind(chrono::Utc::now())
            .execute(pool)
            .await?;

        debug!("User {} liked track {}", user_id, track_id);
        Ok(true)
    }
}

/// Total likes for a track
pub async fn like_count(pool: &SqlitePool, track_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE track_id = ?")
        .bind(track_id.to_string())
        .fetch_one(pool)
        .await?;

    Ok(count)
}
