//! Database models

use crate::time;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment lifecycle state
///
/// Transitions only pending -> completed or pending -> failed; completed
/// and failed rows are kept immutable for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    MobileMoney,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::MobileMoney => "mobile_money",
            PaymentMethod::Card => "card",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mobile_money" => Some(PaymentMethod::MobileMoney),
            "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }
}

/// Method-specific settlement details; provider/phone for mobile money,
/// masked card info for card.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
}

/// One completed or attempted purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub guid: Uuid,
    pub user_id: Uuid,
    pub song_id: Uuid,
    pub artist_id: Uuid,
    /// Smallest currency unit
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_details: PaymentDetails,
    /// Assigned on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One recorded playback; append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    pub song_id: Uuid,
    /// Absent for anonymous plays
    pub user_id: Option<Uuid>,
    pub artist_id: Uuid,
    pub source: String,
    pub occurred_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub guid: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn new(name: &str, email: &str) -> Self {
        let now = time::to_db_timestamp(time::now());
        Self {
            guid: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub guid: Uuid,
    pub name: String,
    pub email: String,
    pub followers: i64,
    pub total_sales: i64,
    pub total_streams: i64,
    pub verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Artist {
    pub fn new(name: &str, email: &str) -> Self {
        let now = time::to_db_timestamp(time::now());
        Self {
            guid: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            followers: 0,
            total_sales: 0,
            total_streams: 0,
            verified: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub guid: Uuid,
    pub artist_id: Uuid,
    pub title: String,
    pub genre: Option<String>,
    /// Smallest currency unit
    pub price: i64,
    pub streams: i64,
    pub purchases: i64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Song {
    pub fn new(artist_id: Uuid, title: &str, genre: Option<&str>, price: i64) -> Self {
        let now = time::to_db_timestamp(time::now());
        Self {
            guid: Uuid::new_v4(),
            artist_id,
            title: title.to_string(),
            genre: genre.map(str::to_string),
            price,
            streams: 0,
            purchases: 0,
            status: "active".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// One entry in a user's purchase history (append-only list, distinct
/// from the library song set)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseHistoryEntry {
    pub song_id: Uuid,
    pub artist_id: Uuid,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    pub purchased_at: String,
}
