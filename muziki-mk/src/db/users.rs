//! User database operations

use muziki_common::db::models::{Payment, PurchaseHistoryEntry, User};
use muziki_common::Result;
use sqlx::{Row, SqliteExecutor, SqlitePool};
use uuid::Uuid;

/// Save user to database
pub async fn insert(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (guid, name, email, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.guid.to_string())
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Load user by id
pub async fn find(pool: &SqlitePool, user_id: Uuid) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT guid, name, email, created_at, updated_at FROM users WHERE guid = ?",
    )
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(User {
            guid: Uuid::parse_str(&row.get::<String, _>("guid"))?,
            name: row.get("name"),
            email: row.get("email"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })),
        None => Ok(None),
    }
}

/// Add a song to the user's library set
///
/// INSERT OR IGNORE against the (user_id, song_id) primary key gives the
/// insert-if-absent semantics: buying a song twice never duplicates it.
pub async fn add_library_song(
    executor: impl SqliteExecutor<'_>,
    user_id: Uuid,
    song_id: Uuid,
    added_at: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO library_songs (user_id, song_id, added_at) VALUES (?, ?, ?)",
    )
    .bind(user_id.to_string())
    .bind(song_id.to_string())
    .bind(added_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Song ids in the user's library
pub async fn library_songs(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Uuid>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT song_id FROM library_songs WHERE user_id = ? ORDER BY added_at",
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(id,)| Uuid::parse_str(&id).map_err(Into::into))
        .collect()
}

/// Append one purchase to the user's history list
pub async fn append_purchase_history(
    executor: impl SqliteExecutor<'_>,
    user_id: Uuid,
    payment: &Payment,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO purchase_history (user_id, song_id, artist_id, amount, payment_method, purchased_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id.to_string())
    .bind(payment.song_id.to_string())
    .bind(payment.artist_id.to_string())
    .bind(payment.amount)
    .bind(payment.payment_method.as_str())
    .bind(&payment.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Purchase history entries, newest first
pub async fn purchase_history(
    pool: &SqlitePool,
    user_id: Uuid,
) -> Result<Vec<PurchaseHistoryEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT song_id, artist_id, amount, payment_method, purchased_at
        FROM purchase_history
        WHERE user_id = ?
        ORDER BY purchased_at DESC, id DESC
        "#,
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let method_raw: String = row.get("payment_method");
            Ok(PurchaseHistoryEntry {
                song_id: Uuid::parse_str(&row.get::<String, _>("song_id"))?,
                artist_id: Uuid::parse_str(&row.get::<String, _>("artist_id"))?,
                amount: row.get("amount"),
                payment_method: muziki_common::db::models::PaymentMethod::parse(&method_raw)
                    .ok_or_else(|| {
                        muziki_common::Error::Internal(format!(
                            "unknown payment method in history: {method_raw}"
                        ))
                    })?,
                purchased_at: row.get("purchased_at"),
            })
        })
        .collect()
}
