//! Analytics aggregation over the payment and stream-event logs

pub mod sales;
pub mod streams;
pub mod window;

pub use window::{percent_change, Period, Window};

use muziki_common::{Error, Result};
use uuid::Uuid;

/// Scope of a stream analytics query; at least one id must be supplied
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamFilter {
    pub artist_id: Option<Uuid>,
    pub song_id: Option<Uuid>,
}

impl StreamFilter {
    pub fn validate(&self) -> Result<()> {
        if self.artist_id.is_none() && self.song_id.is_none() {
            return Err(Error::Validation(
                "either artist_id or song_id is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Top-song ranking only makes sense for an artist-wide query
    pub fn wants_top_songs(&self) -> bool {
        self.artist_id.is_some() && self.song_id.is_none()
    }
}
