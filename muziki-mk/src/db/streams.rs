//! Stream event log operations
//!
//! The event log is append-only; analytics queries count and group over
//! half-open time windows (`occurred_at >= start AND occurred_at < end`).

use muziki_common::db::models::StreamEvent;
use muziki_common::{time, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::analytics::{StreamFilter, Window};

/// Append one playback event
pub async fn insert_event(pool: &SqlitePool, event: &StreamEvent) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO stream_events (song_id, user_id, artist_id, source, occurred_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(event.song_id.to_string())
    .bind(event.user_id.map(|id| id.to_string()))
    .bind(event.artist_id.to_string())
    .bind(&event.source)
    .bind(&event.occurred_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Count events matching the filter within a window
pub async fn count_events(
    pool: &SqlitePool,
    filter: &StreamFilter,
    window: &Window,
) -> Result<i64> {
    let mut sql = String::from(
        "SELECT COUNT(*) FROM stream_events WHERE occurred_at >= ? AND occurred_at < ?",
    );
    if filter.artist_id.is_some() {
        sql.push_str(" AND artist_id = ?");
    }
    if filter.song_id.is_some() {
        sql.push_str(" AND song_id = ?");
    }

    let mut query = sqlx::query_scalar::<_, i64>(&sql)
        .bind(time::to_db_timestamp(window.start))
        .bind(time::to_db_timestamp(window.end));
    if let Some(artist_id) = filter.artist_id {
        query = query.bind(artist_id.to_string());
    }
    if let Some(song_id) = filter.song_id {
        query = query.bind(song_id.to_string());
    }

    Ok(query.fetch_one(pool).await?)
}

/// Per-song play counts for an artist within a window
///
/// Ordered by count descending with song id ascending as the tie-break,
/// so rankings are stable across requests.
pub async fn top_song_counts(
    pool: &SqlitePool,
    artist_id: Uuid,
    window: &Window,
    limit: i64,
) -> Result<Vec<(Uuid, i64)>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT song_id, COUNT(*) AS plays
        FROM stream_events
        WHERE artist_id = ? AND occurred_at >= ? AND occurred_at < ?
        GROUP BY song_id
        ORDER BY plays DESC, song_id ASC
        LIMIT ?
        "#,
    )
    .bind(artist_id.to_string())
    .bind(time::to_db_timestamp(window.start))
    .bind(time::to_db_timestamp(window.end))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(id, plays)| Ok((Uuid::parse_str(&id)?, plays)))
        .collect()
}
