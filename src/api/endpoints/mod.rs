pub mod analytics;
pub mod health;
pub mod medications;
pub mod reminders;
pub mod schedule;

use uuid::Uuid;

use crate::api::error::ApiError;

/// Parse a path id, rejecting malformed values before any store access.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::Validation(format!("Invalid medication ID: {e}")))
}
