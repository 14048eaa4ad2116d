//! Common error types for Muziki

use thiserror::Error;

/// Common result type for Muziki operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error taxonomy across Muziki services
///
/// Validation and auth failures are detected before any write happens;
/// settlement failures always leave an auditable failed payment row behind.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed request input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Missing, malformed, tampered or expired credential
    #[error("Unauthorized: {0}")]
    Auth(String),

    /// Valid credential, wrong role for the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Payment gateway refused the charge
    #[error("Payment declined: {0}")]
    SettlementDeclined(String),

    /// Payment gateway did not answer within the configured deadline
    #[error("Payment gateway timed out after {0}ms")]
    SettlementTimeout(u64),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Error::Internal(format!("invalid uuid in stored data: {err}"))
    }
}
