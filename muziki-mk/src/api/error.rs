//! HTTP mapping of the common error taxonomy
//!
//! Every error path returns `{"error": ..., "category": ...}`. Backend
//! failures are logged in full and surfaced as opaque 500s.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use muziki_common::Error;
use serde_json::json;
use tracing::error;

/// Wrapper turning `muziki_common::Error` into an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, category, message) = match &self.0 {
            Error::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation", msg.clone())
            }
            Error::Auth(msg) => (StatusCode::UNAUTHORIZED, "auth", msg.clone()),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            // Payment failures are a caller-visible outcome, not a server
            // error; the failed payment row has already been persisted.
            Error::SettlementDeclined(_) | Error::SettlementTimeout(_) => (
                StatusCode::PAYMENT_REQUIRED,
                "settlement_failure",
                self.0.to_string(),
            ),
            Error::Database(_) | Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                error!("infrastructure error: {}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "infrastructure",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "category": category,
        }));

        (status, body).into_response()
    }
}
