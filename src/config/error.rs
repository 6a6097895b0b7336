//! Configuration error types

use thiserror::Error;

use crate::domain::form::TemplateUsage;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("No terms configured for {0}")]
    EmptyTerms(&'static str),

    #[error("Invalid term '{term}': {reason}")]
    InvalidTerm { term: String, reason: String },

    #[error("Template {0:?} is empty")]
    EmptyTemplate(TemplateUsage),

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
