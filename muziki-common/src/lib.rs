//! # Muziki Common Library
//!
//! Shared code for the Muziki marketplace services including:
//! - Error taxonomy and crate-wide Result alias
//! - Bearer-token identity (mint/verify, settings-backed secret)
//! - Database bootstrap and row models
//! - Configuration loading
//! - Timestamp and id utilities

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
