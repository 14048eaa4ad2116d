//! Stream endpoints
//!
//! POST /api/streams appends a play event; GET /api/streams answers
//! analytics queries over the event log.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use muziki_common::{time, Error};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::streams::StreamAnalytics;
use crate::analytics::{self, Period, StreamFilter};
use crate::api::{auth, ApiError};
use crate::streams::{self, StreamRequest};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StreamBody {
    pub song_id: Option<String>,
    pub user_id: Option<String>,
    pub artist_id: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub artist_id: Option<Uuid>,
    pub song_id: Option<Uuid>,
    pub period: Option<Period>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/streams - Record a playback event
///
/// Anonymous plays are accepted unless `require_auth.streams` is set. An
/// authenticated listener is attributed even when the body omits user_id.
pub async fn record_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<StreamBody>,
) -> Result<Json<StatusResponse>, ApiError> {
    let claims = auth::maybe_authenticate(&state, &headers);
    if state.config.require_auth.streams && claims.is_none() {
        return Err(Error::Auth("stream recording requires a credential".to_string()).into());
    }

    let mut request = StreamRequest::parse(
        body.song_id.as_deref(),
        body.artist_id.as_deref(),
        body.user_id.as_deref(),
        body.source.as_deref(),
    )?;
    if request.user_id.is_none() {
        request.user_id = claims.map(|c| c.subject);
    }

    streams::record_stream(&state.db, request).await?;

    Ok(Json(StatusResponse {
        status: "recorded".to_string(),
    }))
}

/// GET /api/streams - Stream analytics for an artist and/or song
pub async fn stream_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<StreamAnalytics>, ApiError> {
    let filter = StreamFilter {
        artist_id: query.artist_id,
        song_id: query.song_id,
    };
    let period = query.period.unwrap_or_default();

    let analytics =
        analytics::streams::stream_analytics(&state.db, filter, period, time::now()).await?;
    Ok(Json(analytics))
}
