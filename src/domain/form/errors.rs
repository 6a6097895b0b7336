//! Errors raised while building forms and fields.

use thiserror::Error;

use crate::domain::foundation::ValidationError;

/// A form or field definition could not be built.
#[derive(Debug, Error)]
pub enum FormBuildError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid term pattern for '{field}': {source}")]
    InvalidTerm {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("Step '{step}' depends on unknown step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    #[error("Optional field '{0}' must be nullable")]
    OptionalNotNullable(String),

    #[error("Enumerated field '{0}' has no choices")]
    NoChoices(String),
}
