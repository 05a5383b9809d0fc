//! Listening history table access

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// One listening-history entry joined with track display metadata
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub track_id: Uuid,
    pub title: String,
    pub artist: String,
    pub cover_url: Option<String>,
    pub listened_at: DateTime<Utc>,
}

/// Record that the user listened to a track
pub async fn record_listen(pool: &SqlitePool, user_id: &str, track_id: Uuid) -> Result<()> {
    sqlx::query(
        "INSERT INTO listening_history (id, user_id, track_id, listened_at) VALUES (?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(track_id.to_string())
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Most recent listens for the user, newest first
pub async fn recent_listens(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<HistoryEntry>> {
    let rows = sqlx::query_as::<_, (String, String, String, Option<String>, DateTime<Utc>)>(
        r#"
        SELECT h.track_id, t.title, t.artist, t.cover_url, h.listened_at
        FROM listening_history h
        JOIN tracks t ON t.id = h.track_id
        WHERE h.user_id = ?
        ORDER BY h.listened_at DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| HistoryEntry {
            track_id: Uuid::parse_str(&row.0).unwrap_or_else(|_| Uuid::nil()),
            title: row.1,
            artist: row.2,
            cover_url: row.3,
            listened_at: row.4,
        })
        .collect())
}
