//! HTTP API handlers for muziki-mk

pub mod artist;
pub mod auth;
pub mod error;
pub mod health;
pub mod payments;
pub mod streams;

pub use artist::artist_analytics;
pub use auth::auth_middleware;
pub use error::ApiError;
pub use health::health_routes;
pub use payments::{payment_history, record_payment};
pub use streams::{record_stream, stream_analytics};
