//! UUID parsing helpers for request validation

use crate::{Error, Result};
use uuid::Uuid;

/// Parse a required id field, mapping absence or malformation to a
/// validation error naming the field.
pub fn parse_required(field: &str, value: Option<&str>) -> Result<Uuid> {
    match value {
        None => Err(Error::Validation(format!("{field} is required"))),
        Some(raw) if raw.is_empty() => Err(Error::Validation(format!("{field} is required"))),
        Some(raw) => Uuid::parse_str(raw)
            .map_err(|_| Error::Validation(format!("{field} is not a valid id"))),
    }
}

/// Parse an optional id field; absent and empty both mean "not supplied".
pub fn parse_optional(field: &str, value: Option<&str>) -> Result<Option<Uuid>> {
    match value {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| Error::Validation(format!("{field} is not a valid id"))),
    }
}
