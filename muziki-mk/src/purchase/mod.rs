//! Purchase recording
//!
//! Validates a purchase, settles it through the gateway, and persists the
//! payment together with its side effects (library insert, purchase
//! history, sales counters). Settlement failures still persist a failed
//! payment row so every attempt is auditable.

pub mod settlement;

use muziki_common::db::models::{Payment, PaymentDetails, PaymentMethod, PaymentStatus};
use muziki_common::{time, uuid_utils, Error, Result};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{db, AppState};

/// A fully validated purchase submission
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub song_id: Uuid,
    pub artist_id: Uuid,
    /// Smallest currency unit
    pub amount: i64,
    pub method: PaymentMethod,
    pub details: PaymentDetails,
}

impl PurchaseRequest {
    /// Validate raw wire fields into a purchase request
    ///
    /// Runs before any write; every miss is a validation error naming the
    /// offending field.
    pub fn parse(
        song_id: Option<&str>,
        artist_id: Option<&str>,
        amount: Option<i64>,
        method: Option<&str>,
        details: Option<PaymentDetails>,
    ) -> Result<Self> {
        let song_id = uuid_utils::parse_required("song_id", song_id)?;
        let artist_id = uuid_utils::parse_required("artist_id", artist_id)?;

        let amount = amount.ok_or_else(|| Error::Validation("amount is required".to_string()))?;
        if amount <= 0 {
            return Err(Error::Validation("amount must be positive".to_string()));
        }

        let method = method
            .ok_or_else(|| Error::Validation("payment_method is required".to_string()))
            .and_then(|raw| {
                PaymentMethod::parse(raw).ok_or_else(|| {
                    Error::Validation(format!("invalid payment method: {raw}"))
                })
            })?;

        let details = details
            .ok_or_else(|| Error::Validation("payment_details is required".to_string()))?;
        validate_details(method, &details)?;

        Ok(Self {
            song_id,
            artist_id,
            amount,
            method,
            details,
        })
    }
}

fn validate_details(method: PaymentMethod, details: &PaymentDetails) -> Result<()> {
    fn require(field: &str, value: &Option<String>) -> Result<()> {
        match value {
            Some(v) if !v.is_empty() => Ok(()),
            _ => Err(Error::Validation(format!(
                "payment_details.{field} is required"
            ))),
        }
    }

    match method {
        PaymentMethod::MobileMoney => {
            require("provider", &details.provider)?;
            require("phone_number", &details.phone_number)
        }
        PaymentMethod::Card => {
            require("last4", &details.last4)?;
            require("card_type", &details.card_type)
        }
    }
}

/// Record a purchase for an authenticated buyer
///
/// On settlement success the payment row, library insert, history entry
/// and counter increments are committed in one database transaction, so a
/// charged payment can no longer be stranded without its side effects.
pub async fn record_purchase(
    state: &AppState,
    buyer_id: Uuid,
    request: PurchaseRequest,
) -> Result<Payment> {
    // Existence checks before the gateway is touched
    db::users::find(&state.db, buyer_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user {buyer_id}")))?;
    db::songs::find(&state.db, request.song_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("song {}", request.song_id)))?;
    db::artists::find(&state.db, request.artist_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("artist {}", request.artist_id)))?;

    let created = time::to_db_timestamp(time::now());
    let mut payment = Payment {
        guid: Uuid::new_v4(),
        user_id: buyer_id,
        song_id: request.song_id,
        artist_id: request.artist_id,
        amount: request.amount,
        currency: state.config.currency.clone(),
        status: PaymentStatus::Pending,
        payment_method: request.method,
        payment_details: request.details.clone(),
        transaction_id: None,
        created_at: created.clone(),
        updated_at: created,
    };

    let deadline = Duration::from_millis(state.config.settlement_timeout_ms);
    let outcome = tokio::time::timeout(
        deadline,
        state
            .gateway
            .settle(request.method, request.amount, &payment.currency),
    )
    .await;

    let receipt = match outcome {
        Ok(Ok(receipt)) => receipt,
        Ok(Err(err)) => {
            payment.status = PaymentStatus::Failed;
            payment.updated_at = time::to_db_timestamp(time::now());
            db::payments::insert(&state.db, &payment).await?;
            warn!(payment_id = %payment.guid, "settlement declined: {err}");
            return Err(Error::SettlementDeclined(err.to_string()));
        }
        Err(_) => {
            payment.status = PaymentStatus::Failed;
            payment.updated_at = time::to_db_timestamp(time::now());
            db::payments::insert(&state.db, &payment).await?;
            warn!(
                payment_id = %payment.guid,
                "settlement timed out after {}ms", state.config.settlement_timeout_ms
            );
            return Err(Error::SettlementTimeout(state.config.settlement_timeout_ms));
        }
    };

    payment.status = PaymentStatus::Completed;
    payment.transaction_id = Some(receipt.transaction_id);
    payment.updated_at = time::to_db_timestamp(time::now());

    let mut tx = state.db.begin().await?;
    db::payments::insert(&mut *tx, &payment).await?;
    db::users::add_library_song(&mut *tx, buyer_id, request.song_id, &payment.updated_at).await?;
    db::users::append_purchase_history(&mut *tx, buyer_id, &payment).await?;
    db::artists::increment_total_sales(&mut *tx, request.artist_id).await?;
    db::songs::increment_purchases(&mut *tx, request.song_id).await?;
    tx.commit().await?;

    info!(
        payment_id = %payment.guid,
        song_id = %request.song_id,
        artist_id = %request.artist_id,
        "purchase completed"
    );

    Ok(payment)
}
