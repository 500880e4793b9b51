//! Command abstractions and boundary validation helpers.

use uuid::Uuid;

use crate::error::DomainError;

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// Checks the command's fields before any store access.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming the first malformed field.
    fn validate(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Rejects identifiers that are empty or whitespace-only.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `value` is blank.
pub fn require_identifier(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Rejects non-positive turn numbers.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `year` is zero or negative.
pub fn require_year(year: i64) -> Result<(), DomainError> {
    if year <= 0 {
        return Err(DomainError::Validation(format!(
            "year must be positive, got {year}"
        )));
    }
    Ok(())
}
