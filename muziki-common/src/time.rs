//! Timestamp utilities
//!
//! All persisted timestamps are RFC3339 UTC with millisecond precision so
//! that lexicographic comparison in SQL matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Render a timestamp in the canonical stored form
pub fn to_db_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Calendar-date bucket key (`YYYY-MM-DD`) for a timestamp
pub fn day_key(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}
