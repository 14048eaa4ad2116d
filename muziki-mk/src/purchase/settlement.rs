//! Settlement gateway seam
//!
//! The trait is the integration point for a real mobile money or card
//! processor; the shipped implementation reproduces the original
//! delay-then-succeed simulation. The recorder applies its own deadline
//! around `settle`, so implementations do not need to time-bound
//! themselves.

use async_trait::async_trait;
use muziki_common::db::models::PaymentMethod;
use std::time::Duration;
use uuid::Uuid;

/// Proof of a successful settlement
#[derive(Debug, Clone)]
pub struct SettlementReceipt {
    pub transaction_id: String,
}

/// Explicit gateway refusal (timeouts are detected by the caller)
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("declined: {0}")]
    Declined(String),
}

#[async_trait]
pub trait SettlementGateway: Send + Sync {
    async fn settle(
        &self,
        method: PaymentMethod,
        amount: i64,
        currency: &str,
    ) -> Result<SettlementReceipt, SettlementError>;
}

/// Stand-in for a real payment processor
///
/// Waits out a configured latency and reports success, or a fixed decline
/// when constructed with `declining` (used to exercise failure paths).
pub struct SimulatedGateway {
    delay: Duration,
    decline: Option<String>,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            decline: None,
        }
    }

    pub fn declining(reason: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            decline: Some(reason.to_string()),
        }
    }
}

#[async_trait]
impl SettlementGateway for SimulatedGateway {
    async fn settle(
        &self,
        _method: PaymentMethod,
        _amount: i64,
        _currency: &str,
    ) -> Result<SettlementReceipt, SettlementError> {
        tokio::time::sleep(self.delay).await;

        match &self.decline {
            Some(reason) => Err(SettlementError::Declined(reason.clone())),
            None => Ok(SettlementReceipt {
                transaction_id: new_transaction_id(),
            }),
        }
    }
}

/// `TXN` plus the decimal digits of a v4 UUID
///
/// Keeps the provider-style all-digit surface while avoiding the
/// collision window of wall-clock-plus-random schemes.
pub fn new_transaction_id() -> String {
    format!("TXN{}", Uuid::new_v4().as_u128())
}
