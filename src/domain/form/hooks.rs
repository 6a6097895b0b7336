//! Field-level extension points: validation and just-in-time definition.

use async_trait::async_trait;
use thiserror::Error;

use super::field::FieldBuilder;
use super::prompt::FormPrompt;
use crate::domain::foundation::{FieldValue, FormData};

/// Errors raised by host-supplied hooks.
#[derive(Debug, Clone, Error)]
pub enum HookError {
    #[error("Validation of '{field}' failed: {reason}")]
    Validator { field: String, reason: String },

    #[error("Definition of '{field}' failed: {reason}")]
    Definer { field: String, reason: String },

    #[error("Message generation failed: {0}")]
    Message(String),

    #[error("Completion failed: {0}")]
    Completion(String),
}

/// Outcome of validating a candidate value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidateResult {
    pub is_valid: bool,
    /// Shown to the user; required in practice when invalid.
    pub feedback: Option<String>,
    /// Replacement value to store instead of the candidate.
    pub value: Option<FieldValue>,
    /// Values the candidate could mean; starts a clarification when invalid.
    pub choices: Vec<FieldValue>,
}

impl ValidateResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            ..Default::default()
        }
    }

    pub fn corrected(value: FieldValue) -> Self {
        Self {
            is_valid: true,
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn invalid(feedback: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            feedback: Some(feedback.into()),
            ..Default::default()
        }
    }

    pub fn ambiguous(choices: Vec<FieldValue>) -> Self {
        Self {
            is_valid: false,
            choices,
            ..Default::default()
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }
}

/// Checks a value before it is committed to a field.
#[async_trait]
pub trait FieldValidator: Send + Sync {
    /// `None` is the null value, e.g. a "no preference" answer.
    async fn validate(
        &self,
        data: &FormData,
        value: Option<&FieldValue>,
    ) -> Result<ValidateResult, HookError>;
}

/// Recomputes a field's definition from the current data.
#[async_trait]
pub trait FieldDefiner: Send + Sync {
    /// Returns the field to use this pass, or `None` to skip it.
    async fn define(
        &self,
        data: &FormData,
        field: FieldBuilder,
    ) -> Result<Option<FieldBuilder>, HookError>;
}

/// Computes the text of a message step when it is reached.
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    async fn generate(&self, data: &FormData) -> Result<FormPrompt, HookError>;
}

/// Adapts a synchronous closure into a [`FieldValidator`].
pub struct ValidateFn<F>(pub F);

#[async_trait]
impl<F> FieldValidator for ValidateFn<F>
where
    F: Fn(&FormData, Option<&FieldValue>) -> ValidateResult + Send + Sync,
{
    async fn validate(
        &self,
        data: &FormData,
        value: Option<&FieldValue>,
    ) -> Result<ValidateResult, HookError> {
        Ok((self.0)(data, value))
    }
}

/// Adapts a synchronous closure into a [`FieldDefiner`].
pub struct DefineFn<F>(pub F);

#[async_trait]
impl<F> FieldDefiner for DefineFn<F>
where
    F: Fn(&FormData, FieldBuilder) -> Option<FieldBuilder> + Send + Sync,
{
    async fn define(
        &self,
        data: &FormData,
        field: FieldBuilder,
    ) -> Result<Option<FieldBuilder>, HookError> {
        Ok((self.0)(data, field))
    }
}

/// Adapts a synchronous closure into a [`MessageGenerator`].
pub struct MessageFn<F>(pub F);

#[async_trait]
impl<F> MessageGenerator for MessageFn<F>
where
    F: Fn(&FormData) -> FormPrompt + Send + Sync,
{
    async fn generate(&self, data: &FormData) -> Result<FormPrompt, HookError> {
        Ok((self.0)(data))
    }
}
