//! Sales analytics for the artist dashboard
//!
//! Sibling of the stream aggregator: same windowing and grouping
//! primitives, applied to completed payments instead of play events.

use chrono::{DateTime, Duration, Utc};
use muziki_common::db::models::Payment;
use muziki_common::{time, Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use super::window::Window;
use crate::db;

/// Daily buckets rendered for the dashboard chart
const CHART_DAYS: i64 = 30;

const RECENT_PAYMENTS_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
pub struct SalesAnalytics {
    /// Sum of completed payment amounts, smallest currency unit
    pub total_earnings: i64,
    /// Count of completed payments
    pub total_sales: i64,
    pub total_songs: i64,
    pub followers: i64,
    pub sales_by_song: Vec<SongSales>,
    /// Exactly 30 zero-filled entries, oldest first
    pub sales_by_date: Vec<DailySales>,
    pub payment_methods: MethodBreakdown,
    pub recent_payments: Vec<Payment>,
}

#[derive(Debug, Serialize)]
pub struct SongSales {
    pub song_id: Uuid,
    pub count: i64,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct DailySales {
    /// `YYYY-MM-DD`
    pub date: String,
    pub count: i64,
    pub amount: i64,
}

#[derive(Debug, Default, Serialize)]
pub struct MethodBreakdown {
    pub mobile_money: i64,
    pub card: i64,
}

/// Aggregate an artist's completed payments for the dashboard
pub async fn sales_analytics(
    pool: &SqlitePool,
    artist_id: Uuid,
    now: DateTime<Utc>,
) -> Result<SalesAnalytics> {
    let artist = db::artists::find(pool, artist_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("artist {artist_id}")))?;

    let total_songs = db::songs::count_for_artist(pool, artist_id).await?;
    let (total_sales, total_earnings) = db::payments::totals_for_artist(pool, artist_id).await?;
    let sales_by_song = db::payments::totals_by_song(pool, artist_id)
        .await?
        .into_iter()
        .map(|(song_id, count, amount)| SongSales {
            song_id,
            count,
            amount,
        })
        .collect();

    let window = Window::trailing_days(CHART_DAYS, now);
    let buckets = db::payments::daily_totals(pool, artist_id, &window).await?;
    let sales_by_date = daily_series(buckets, now, CHART_DAYS);

    let payment_methods = db::payments::method_counts(pool, artist_id)
        .await?
        .into_iter()
        .fold(MethodBreakdown::default(), |mut acc, (method, count)| {
            match method.as_str() {
                "mobile_money" => acc.mobile_money = count,
                "card" => acc.card = count,
                _ => {}
            }
            acc
        });
    let recent_payments =
        db::payments::recent_for_artist(pool, artist_id, RECENT_PAYMENTS_LIMIT).await?;

    Ok(SalesAnalytics {
        total_earnings,
        total_sales,
        total_songs,
        followers: artist.followers,
        sales_by_song,
        sales_by_date,
        payment_methods,
        recent_payments,
    })
}

/// Zero-fill sparse date buckets into a dense trailing series, oldest
/// first and ending today
fn daily_series(
    buckets: Vec<(String, i64, i64)>,
    now: DateTime<Utc>,
    days: i64,
) -> Vec<DailySales> {
    let by_day: HashMap<String, (i64, i64)> = buckets
        .into_iter()
        .map(|(date, count, amount)| (date, (count, amount)))
        .collect();

    (0..days)
        .rev()
        .map(|offset| {
            let date = time::day_key(now - Duration::days(offset));
            let (count, amount) = by_day.get(&date).copied().unwrap_or((0, 0));
            DailySales {
                date,
                count,
                amount,
            }
        })
        .collect()
}
