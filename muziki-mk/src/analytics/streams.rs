//! Stream analytics aggregation
//!
//! Counts play events for the requested scope over the current and
//! immediately preceding period windows, and ranks an artist's top songs
//! within the current window.

use muziki_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use super::window::{percent_change, Period, Window};
use super::StreamFilter;
use crate::db;

/// Placeholder used when a ranked song id no longer resolves
const UNKNOWN: &str = "Unknown";

const TOP_SONGS_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
pub struct StreamAnalytics {
    pub total_streams: i64,
    /// Count over the preceding window; lets callers tell "no prior
    /// data" apart from the flattened percent_change of 0
    pub previous_streams: i64,
    pub percent_change: f64,
    pub period: Period,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_songs: Option<Vec<TopSong>>,
}

#[derive(Debug, Serialize)]
pub struct TopSong {
    pub song_id: Uuid,
    pub title: String,
    pub artist: String,
    pub streams: i64,
}

/// Aggregate play counts for an artist and/or song over a period
pub async fn stream_analytics(
    pool: &SqlitePool,
    filter: StreamFilter,
    period: Period,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<StreamAnalytics> {
    filter.validate()?;

    let window = period.current_window(now);
    let total_streams = db::streams::count_events(pool, &filter, &window).await?;

    let previous_streams = if period.has_previous_window() {
        db::streams::count_events(pool, &filter, &window.previous()).await?
    } else {
        0
    };

    let top_songs = match filter.artist_id {
        Some(artist_id) if filter.wants_top_songs() => {
            Some(top_songs(pool, artist_id, &window).await?)
        }
        _ => None,
    };

    Ok(StreamAnalytics {
        total_streams,
        previous_streams,
        percent_change: percent_change(total_streams, previous_streams),
        period,
        top_songs,
    })
}

/// Rank an artist's most-played songs within the window
///
/// Ties are broken by song id ascending so the ordering is deterministic
/// across requests. A song that cannot be resolved any more is reported
/// with placeholder metadata instead of failing the call.
async fn top_songs(pool: &SqlitePool, artist_id: Uuid, window: &Window) -> Result<Vec<TopSong>> {
    let counts =
        db::streams::top_song_counts(pool, artist_id, window, TOP_SONGS_LIMIT).await?;

    let mut ranked = Vec::with_capacity(counts.len());
    for (song_id, streams) in counts {
        let summary = db::songs::find_summary(pool, song_id).await?;
        let (title, artist) = match summary {
            Some(pair) => pair,
            None => {
                warn!(song_id = %song_id, "ranked song no longer resolves");
                (UNKNOWN.to_string(), UNKNOWN.to_string())
            }
        };
        ranked.push(TopSong {
            song_id,
            title,
            artist,
            streams,
        });
    }

    Ok(ranked)
}
