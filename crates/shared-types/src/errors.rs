//! # Error Types
//!
//! Validation errors raised before anything is submitted to the ledger.

use thiserror::Error;

/// Malformed user input (non-numeric coordinate, bad address, ...).
///
/// Always caught before submission; the action is blocked locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending field, in dashboard vocabulary.
    pub field: &'static str,
    /// Human readable reason.
    pub reason: String,
}

impl ValidationError {
    /// Create a new validation error for `field`.
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Fails with a `ValidationError` when `value` is empty or whitespace.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}
