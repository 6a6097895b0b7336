//! Form State Store Port - Interface for persisting in-progress forms.
//!
//! A stored form is the host-owned data plus the dialog's form state,
//! keyed by conversation. It lives only while the form is in progress.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::form::FormState;
use crate::domain::foundation::{ConversationId, FormData};

/// Everything needed to resume a conversation's form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredForm {
    pub data: FormData,
    pub state: FormState,
}

impl StoredForm {
    pub fn new(data: FormData, state: FormState) -> Self {
        Self { data, state }
    }
}

/// Errors that can occur during form storage operations
#[derive(Debug, thiserror::Error)]
pub enum FormStoreError {
    #[error("Form not found for conversation: {0}")]
    NotFound(ConversationId),

    #[error("Failed to serialize form: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize form: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for persisting and loading in-progress forms
#[async_trait]
pub trait FormStateStore: Send + Sync {
    /// Save a form
    ///
    /// # Arguments
    /// * `id` - The conversation ID
    /// * `form` - Data and state to save
    ///
    /// # Errors
    /// Returns `FormStoreError` if save fails
    async fn save(&self, id: ConversationId, form: &StoredForm) -> Result<(), FormStoreError>;

    /// Load a form
    ///
    /// # Errors
    /// Returns `FormStoreError::NotFound` if nothing is stored
    async fn load(&self, id: ConversationId) -> Result<StoredForm, FormStoreError>;

    /// Check if a form is stored for a conversation
    async fn exists(&self, id: ConversationId) -> Result<bool, FormStoreError>;

    /// Delete a stored form; deleting a missing form is not an error
    async fn delete(&self, id: ConversationId) -> Result<(), FormStoreError>;
}
