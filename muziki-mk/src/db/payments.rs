//! Payment database operations

use muziki_common::db::models::{Payment, PaymentDetails, PaymentMethod, PaymentStatus};
use muziki_common::{time, Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::analytics::Window;

/// Persist a payment row (completed and failed attempts alike)
pub async fn insert(executor: impl SqliteExecutor<'_>, payment: &Payment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO payments (
            guid, user_id, song_id, artist_id, amount, currency, status,
            payment_method, provider, phone_number, card_last4, card_type,
            transaction_id, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payment.guid.to_string())
    .bind(payment.user_id.to_string())
    .bind(payment.song_id.to_string())
    .bind(payment.artist_id.to_string())
    .bind(payment.amount)
    .bind(&payment.currency)
    .bind(payment.status.as_str())
    .bind(payment.payment_method.as_str())
    .bind(&payment.payment_details.provider)
    .bind(&payment.payment_details.phone_number)
    .bind(&payment.payment_details.last4)
    .bind(&payment.payment_details.card_type)
    .bind(&payment.transaction_id)
    .bind(&payment.created_at)
    .bind(&payment.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// All payments made by a buyer, newest first
pub async fn list_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Payment>> {
    let rows = sqlx::query(
        "SELECT * FROM payments WHERE user_id = ? ORDER BY created_at DESC, guid",
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(payment_from_row).collect()
}

/// An artist's most recent completed payments
pub async fn recent_for_artist(
    pool: &SqlitePool,
    artist_id: Uuid,
    limit: i64,
) -> Result<Vec<Payment>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM payments
        WHERE artist_id = ? AND status = 'completed'
        ORDER BY created_at DESC, guid
        LIMIT ?
        "#,
    )
    .bind(artist_id.to_string())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(payment_from_row).collect()
}

/// Count and amount sum of an artist's completed payments
pub async fn totals_for_artist(pool: &SqlitePool, artist_id: Uuid) -> Result<(i64, i64)> {
    let totals: (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(amount), 0)
        FROM payments
        WHERE artist_id = ? AND status = 'completed'
        "#,
    )
    .bind(artist_id.to_string())
    .fetch_one(pool)
    .await?;
    Ok(totals)
}

/// Completed payments grouped per song: (song_id, count, amount)
pub async fn totals_by_song(
    pool: &SqlitePool,
    artist_id: Uuid,
) -> Result<Vec<(Uuid, i64, i64)>> {
    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT song_id, COUNT(*) AS sales, COALESCE(SUM(amount), 0)
        FROM payments
        WHERE artist_id = ? AND status = 'completed'
        GROUP BY song_id
        ORDER BY sales DESC, song_id ASC
        "#,
    )
    .bind(artist_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(id, count, amount)| Ok((Uuid::parse_str(&id)?, count, amount)))
        .collect()
}

/// Completed payments bucketed per calendar date within the window:
/// (YYYY-MM-DD, count, amount)
pub async fn daily_totals(
    pool: &SqlitePool,
    artist_id: Uuid,
    window: &Window,
) -> Result<Vec<(String, i64, i64)>> {
    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT substr(created_at, 1, 10) AS day, COUNT(*), COALESCE(SUM(amount), 0)
        FROM payments
        WHERE artist_id = ? AND status = 'completed'
          AND created_at >= ? AND created_at < ?
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(artist_id.to_string())
    .bind(time::to_db_timestamp(window.start))
    .bind(time::to_db_timestamp(window.end))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Completed payments tallied per method: (method, count)
pub async fn method_counts(pool: &SqlitePool, artist_id: Uuid) -> Result<Vec<(String, i64)>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT payment_method, COUNT(*)
        FROM payments
        WHERE artist_id = ? AND status = 'completed'
        GROUP BY payment_method
        "#,
    )
    .bind(artist_id.to_string())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

fn payment_from_row(row: &SqliteRow) -> Result<Payment> {
    let status_raw: String = row.get("status");
    let method_raw: String = row.get("payment_method");

    Ok(Payment {
        guid: Uuid::parse_str(&row.get::<String, _>("guid"))?,
        user_id: Uuid::parse_str(&row.get::<String, _>("user_id"))?,
        song_id: Uuid::parse_str(&row.get::<String, _>("song_id"))?,
        artist_id: Uuid::parse_str(&row.get::<String, _>("artist_id"))?,
        amount: row.get("amount"),
        currency: row.get("currency"),
        status: PaymentStatus::parse(&status_raw)
            .ok_or_else(|| Error::Internal(format!("unknown payment status: {status_raw}")))?,
        payment_method: PaymentMethod::parse(&method_raw)
            .ok_or_else(|| Error::Internal(format!("unknown payment method: {method_raw}")))?,
        payment_details: PaymentDetails {
            provider: row.get("provider"),
            phone_number: row.get("phone_number"),
            last4: row.get("card_last4"),
            card_type: row.get("card_type"),
        },
        transaction_id: row.get("transaction_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
