//! Song database operations

use muziki_common::db::models::Song;
use muziki_common::Result;
use sqlx::{Row, SqliteExecutor, SqlitePool};
use uuid::Uuid;

/// Save song to database
pub async fn insert(pool: &SqlitePool, song: &Song) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO songs (
            guid, artist_id, title, genre, price, streams, purchases,
            status, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(song.guid.to_string())
    .bind(song.artist_id.to_string())
    .bind(&song.title)
    .bind(&song.genre)
    .bind(song.price)
    .bind(song.streams)
    .bind(song.purchases)
    .bind(&song.status)
    .bind(&song.created_at)
    .bind(&song.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Load song by id
pub async fn find(pool: &SqlitePool, song_id: Uuid) -> Result<Option<Song>> {
    let row = sqlx::query(
        r#"
        SELECT guid, artist_id, title, genre, price, streams, purchases,
               status, created_at, updated_at
        FROM songs
        WHERE guid = ?
        "#,
    )
    .bind(song_id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(Song {
            guid: Uuid::parse_str(&row.get::<String, _>("guid"))?,
            artist_id: Uuid::parse_str(&row.get::<String, _>("artist_id"))?,
            title: row.get("title"),
            genre: row.get("genre"),
            price: row.get("price"),
            streams: row.get("streams"),
            purchases: row.get("purchases"),
            status: row.get("status"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })),
        None => Ok(None),
    }
}

/// Title and artist name for display, or None when the song is gone
pub async fn find_summary(pool: &SqlitePool, song_id: Uuid) -> Result<Option<(String, String)>> {
    let row: Option<(String, String)> = sqlx::query_as(
        r#"
        SELECT s.title, a.name
        FROM songs s
        JOIN artists a ON a.guid = s.artist_id
        WHERE s.guid = ?
        "#,
    )
    .bind(song_id.to_string())
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Number of songs in an artist's catalog
pub async fn count_for_artist(pool: &SqlitePool, artist_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs WHERE artist_id = ?")
        .bind(artist_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Atomic single-row increment; no read-modify-write race
pub async fn increment_streams(executor: impl SqliteExecutor<'_>, song_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE songs SET streams = streams + 1 WHERE guid = ?")
        .bind(song_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}

/// Atomic single-row increment; no read-modify-write race
pub async fn increment_purchases(executor: impl SqliteExecutor<'_>, song_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE songs SET purchases = purchases + 1 WHERE guid = ?")
        .bind(song_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}
