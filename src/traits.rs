//! Core traits for the metrics store

use crate::error::ValidationError;

/// Boundary check for values handed to the store by collaborators.
///
/// The plain recording operations never call this; the `try_*` variants on
/// [`MetricsStore`](crate::MetricsStore) do.
pub trait Validate {
    /// Check the value for completeness and internal consistency
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Check that a millisecond duration is finite and not negative
pub(crate) fn validate_duration(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidInput {
            field: field.to_string(),
            reason: format!("duration must be finite, got {}", value),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::InvalidInput {
            field: field.to_string(),
            reason: format!("duration cannot be negative, got {}", value),
        });
    }
    Ok(())
}
