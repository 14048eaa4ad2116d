//! Service configuration loading
//!
//! Resolution priority: explicit path (CLI) > platform config directory >
//! compiled defaults. Individual values can still be overridden by CLI
//! flags in the service binary.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Marketplace service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Port the HTTP server listens on
    pub port: u16,

    /// SQLite database file; resolved to the platform data dir when unset
    pub database_path: Option<PathBuf>,

    /// ISO currency code applied to every payment
    pub currency: String,

    /// Deadline for a single settlement attempt
    pub settlement_timeout_ms: u64,

    /// Latency of the simulated payment gateway
    pub settlement_delay_ms: u64,

    /// Credential lifetime handed out by the identity endpoint
    pub token_ttl_secs: i64,

    pub require_auth: RequireAuth,
}

/// Per-operation authentication switches
///
/// Anonymous stream recording is allowed by default; purchases always
/// carry a buyer identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RequireAuth {
    pub streams: bool,
}

impl Default for RequireAuth {
    fn default() -> Self {
        Self { streams: false }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 5860,
            database_path: None,
            currency: "UGX".to_string(),
            settlement_timeout_ms: 5000,
            settlement_delay_ms: 1000,
            token_ttl_secs: crate::auth::DEFAULT_TOKEN_TTL_SECS,
            require_auth: RequireAuth::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration, falling back to defaults when no file exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = default_config_file() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Database path, resolved against the platform data dir when unset
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("muziki").join("config.toml"))
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("muziki").join("muziki.db"))
        .unwrap_or_else(|| PathBuf::from("./muziki.db"))
}
