//! Bearer-token identity verification
//!
//! Tokens have the form `subject.role.expires_at.signature` where the
//! signature is SHA-256 over the first three fields plus a server-side
//! secret. The secret lives in the `settings` table and is generated on
//! first run. This module contains only pure functions and database
//! operations; HTTP framework concerns live in the service crates.

use crate::{time, Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Settings key under which the signing secret is stored
pub const SECRET_SETTING_KEY: &str = "auth_token_secret";

/// Default credential lifetime: 7 days
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 3600;

/// Subject kind carried by a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Artist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Artist => "artist",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "artist" => Some(Role::Artist),
            _ => None,
        }
    }
}

/// Verified identity extracted from a credential
#[derive(Debug, Clone)]
pub struct AuthClaims {
    pub subject: Uuid,
    pub role: Role,
    pub expires_at: i64,
}

/// Mint a signed credential for a subject
pub fn mint_token(subject: Uuid, role: Role, ttl_secs: i64, secret: &str) -> String {
    let expires_at = time::now().timestamp() + ttl_secs;
    let payload = format!("{}.{}.{}", subject, role.as_str(), expires_at);
    let signature = sign(&payload, secret);
    format!("{payload}.{signature}")
}

/// Verify a credential and return its claims
///
/// Rejects malformed, tampered and expired tokens. Never panics on
/// attacker-controlled input.
pub fn verify_token(token: &str, secret: &str) -> Result<AuthClaims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 4 {
        return Err(Error::Auth("malformed token".to_string()));
    }

    let payload = format!("{}.{}.{}", parts[0], parts[1], parts[2]);
    if sign(&payload, secret) != parts[3] {
        return Err(Error::Auth("invalid token signature".to_string()));
    }

    // Signature checked first, so these fields are server-issued from here on
    let subject = Uuid::parse_str(parts[0])
        .map_err(|_| Error::Auth("invalid token subject".to_string()))?;
    let role =
        Role::parse(parts[1]).ok_or_else(|| Error::Auth("unknown token role".to_string()))?;
    let expires_at: i64 = parts[2]
        .parse()
        .map_err(|_| Error::Auth("invalid token expiry".to_string()))?;

    if expires_at < time::now().timestamp() {
        return Err(Error::Auth("token expired".to_string()));
    }

    Ok(AuthClaims {
        subject,
        role,
        expires_at,
    })
}

fn sign(payload: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(b".");
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Load the signing secret from settings, generating and persisting a
/// random one on first run.
pub async fn load_or_init_secret(pool: &SqlitePool) -> Result<String> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(SECRET_SETTING_KEY)
            .fetch_optional(pool)
            .await?;

    match row {
        Some((secret,)) => Ok(secret),
        None => {
            let secret = generate_secret();
            sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
                .bind(SECRET_SETTING_KEY)
                .bind(&secret)
                .execute(pool)
                .await?;
            Ok(secret)
        }
    }
}

fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
