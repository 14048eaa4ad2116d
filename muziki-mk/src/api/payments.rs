//! Purchase endpoints
//!
//! POST /api/payments records a purchase through the settlement gateway;
//! GET /api/payments returns the caller's payment history, newest first.

use axum::extract::State;
use axum::{Extension, Json};
use muziki_common::auth::{AuthClaims, Role};
use muziki_common::db::models::{Payment, PaymentDetails};
use muziki_common::Error;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::purchase::{self, PurchaseRequest};
use crate::{db, AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Purchase submission body
///
/// Everything is optional at the wire level; `PurchaseRequest::parse`
/// turns this into a validated request or a validation error before any
/// side effect happens.
#[derive(Debug, Deserialize)]
pub struct PaymentBody {
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub amount: Option<i64>,
    pub payment_method: Option<String>,
    pub payment_details: Option<PaymentDetails>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment: Payment,
}

#[derive(Debug, Serialize)]
pub struct PaymentHistoryResponse {
    pub payments: Vec<Payment>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/payments - Record a purchase
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Json(body): Json<PaymentBody>,
) -> Result<Json<PaymentResponse>, ApiError> {
    if claims.role != Role::User {
        return Err(Error::Forbidden("purchases require a listener account".to_string()).into());
    }

    let request = PurchaseRequest::parse(
        body.song_id.as_deref(),
        body.artist_id.as_deref(),
        body.amount,
        body.payment_method.as_deref(),
        body.payment_details,
    )?;

    let payment = purchase::record_purchase(&state, claims.subject, request).await?;
    Ok(Json(PaymentResponse { payment }))
}

/// GET /api/payments - Payment history for the authenticated buyer
pub async fn payment_history(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<PaymentHistoryResponse>, ApiError> {
    if claims.role != Role::User {
        return Err(Error::Forbidden("payment history is per-listener".to_string()).into());
    }

    let payments = db::payments::list_for_user(&state.db, claims.subject).await?;
    Ok(Json(PaymentHistoryResponse { payments }))
}
