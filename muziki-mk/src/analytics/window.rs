//! Period windows and comparison math
//!
//! Windows are half-open `[start, end)` so an event on the boundary
//! between the current and previous window is counted exactly once.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// Reporting period for analytics queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    #[default]
    Month,
    Year,
    All,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::All => "all",
        }
    }

    /// Window covering the most recent period: `[now - length, now)`.
    /// Month and year subtract calendar units; `all` starts at the epoch.
    pub fn current_window(&self, now: DateTime<Utc>) -> Window {
        let start = match self {
            Period::Day => now - Duration::days(1),
            Period::Week => now - Duration::weeks(1),
            Period::Month => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(now - Duration::days(30)),
            Period::Year => now
                .checked_sub_months(Months::new(12))
                .unwrap_or(now - Duration::days(365)),
            Period::All => DateTime::<Utc>::UNIX_EPOCH,
        };
        Window { start, end: now }
    }

    /// `all` has no meaningful prior window to compare against
    pub fn has_previous_window(&self) -> bool {
        !matches!(self, Period::All)
    }
}

/// Half-open time range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    /// The immediately preceding window of identical length
    pub fn previous(&self) -> Window {
        Window {
            start: self.start - self.length(),
            end: self.start,
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }

    /// Trailing window of `days` whole days ending now
    pub fn trailing_days(days: i64, now: DateTime<Utc>) -> Window {
        Window {
            start: now - Duration::days(days),
            end: now,
        }
    }
}

/// Period-over-period change as a percentage rounded to one decimal
///
/// A zero previous-period count yields 0.0 by policy, never NaN or
/// infinity; callers that need to distinguish "no prior data" from
/// "genuinely flat" also get the raw previous count.
pub fn percent_change(current: i64, previous: i64) -> f64 {
    if previous <= 0 {
        return 0.0;
    }
    let raw = (current - previous) as f64 / previous as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}
