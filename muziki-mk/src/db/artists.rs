//! Artist database operations

use muziki_common::db::models::Artist;
use muziki_common::Result;
use sqlx::{Row, SqliteExecutor, SqlitePool};
use uuid::Uuid;

/// Save artist to database
pub async fn insert(pool: &SqlitePool, artist: &Artist) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO artists (
            guid, name, email, followers, total_sales, total_streams,
            verified, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(artist.guid.to_string())
    .bind(&artist.name)
    .bind(&artist.email)
    .bind(artist.followers)
    .bind(artist.total_sales)
    .bind(artist.total_streams)
    .bind(artist.verified)
    .bind(&artist.created_at)
    .bind(&artist.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Load artist by id
pub async fn find(pool: &SqlitePool, artist_id: Uuid) -> Result<Option<Artist>> {
    let row = sqlx::query(
        r#"
        SELECT guid, name, email, followers, total_sales, total_streams,
               verified, created_at, updated_at
        FROM artists
        WHERE guid = ?
        "#,
    )
    .bind(artist_id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(Artist {
            guid: Uuid::parse_str(&row.get::<String, _>("guid"))?,
            name: row.get("name"),
            email: row.get("email"),
            followers: row.get("followers"),
            total_sales: row.get("total_sales"),
            total_streams: row.get("total_streams"),
            verified: row.get("verified"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })),
        None => Ok(None),
    }
}

/// Atomic single-row increment; no read-modify-write race
pub async fn increment_total_sales(
    executor: impl SqliteExecutor<'_>,
    artist_id: Uuid,
) -> Result<()> {
    sqlx::query("UPDATE artists SET total_sales = total_sales + 1 WHERE guid = ?")
        .bind(artist_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}

/// Atomic single-row increment; no read-modify-write race
pub async fn increment_total_streams(
    executor: impl SqliteExecutor<'_>,
    artist_id: Uuid,
) -> Result<()> {
    sqlx::query("UPDATE artists SET total_streams = total_streams + 1 WHERE guid = ?")
        .bind(artist_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}
