//! Error types for the domain layer.

use thiserror::Error;

/// Errors that occur while validating form definitions and value objects.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must have min <= max, got {min} > {max}")]
    InvalidLimits { field: String, min: f64, max: f64 },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Duplicate {kind} '{name}'")]
    Duplicate { kind: &'static str, name: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid limits validation error.
    pub fn invalid_limits(field: impl Into<String>, min: f64, max: f64) -> Self {
        ValidationError::InvalidLimits {
            field: field.into(),
            min,
            max,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a duplicate name validation error.
    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        ValidationError::Duplicate {
            kind,
            name: name.into(),
        }
    }
}
