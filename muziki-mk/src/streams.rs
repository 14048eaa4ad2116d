//! Stream event recording
//!
//! Appends a play event and bumps the denormalized counters on the song
//! and artist rows. The three writes are deliberately independent: the
//! event log is the source of truth, counters are best-effort and can be
//! rebuilt from it.

use muziki_common::db::models::StreamEvent;
use muziki_common::{time, uuid_utils, Result};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::db;

/// Source tag applied when the submission omits one
pub const DEFAULT_SOURCE: &str = "player";

/// A validated playback submission
#[derive(Debug, Clone)]
pub struct StreamRequest {
    pub song_id: Uuid,
    pub artist_id: Uuid,
    /// None for anonymous plays
    pub user_id: Option<Uuid>,
    pub source: String,
}

impl StreamRequest {
    pub fn parse(
        song_id: Option<&str>,
        artist_id: Option<&str>,
        user_id: Option<&str>,
        source: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            song_id: uuid_utils::parse_required("song_id", song_id)?,
            artist_id: uuid_utils::parse_required("artist_id", artist_id)?,
            user_id: uuid_utils::parse_optional("user_id", user_id)?,
            source: source
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_SOURCE)
                .to_string(),
        })
    }
}

/// Record one playback
pub async fn record_stream(pool: &SqlitePool, request: StreamRequest) -> Result<()> {
    let event = StreamEvent {
        song_id: request.song_id,
        user_id: request.user_id,
        artist_id: request.artist_id,
        source: request.source,
        // Server-assigned; client clocks are not trusted
        occurred_at: time::to_db_timestamp(time::now()),
    };

    db::streams::insert_event(pool, &event).await?;
    db::songs::increment_streams(pool, request.song_id).await?;
    db::artists::increment_total_streams(pool, request.artist_id).await?;

    debug!(song_id = %request.song_id, source = %event.source, "stream recorded");
    Ok(())
}
