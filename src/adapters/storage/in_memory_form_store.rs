//! In-Memory Form Store Adapter
//!
//! Keeps forms in memory as JSON, so everything stored has been through the
//! same serialization a durable store would apply. Useful for testing and
//! development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::ConversationId;
use crate::ports::{FormStateStore, FormStoreError, StoredForm};

/// In-memory storage for in-progress forms
#[derive(Debug, Clone, Default)]
pub struct InMemoryFormStore {
    forms: Arc<RwLock<HashMap<ConversationId, String>>>,
}

impl InMemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored forms (useful for tests)
    pub async fn clear(&self) {
        self.forms.write().await.clear();
    }

    /// Number of stored forms
    pub async fn len(&self) -> usize {
        self.forms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.forms.read().await.is_empty()
    }
}

#[async_trait]
impl FormStateStore for InMemoryFormStore {
    async fn save(&self, id: ConversationId, form: &StoredForm) -> Result<(), FormStoreError> {
        let json = serde_json::to_string(form)
            .map_err(|e| FormStoreError::SerializationFailed(e.to_string()))?;
        self.forms.write().await.insert(id, json);
        Ok(())
    }

    async fn load(&self, id: ConversationId) -> Result<StoredForm, FormStoreError> {
        let forms = self.forms.read().await;
        let json = forms.get(&id).ok_or(FormStoreError::NotFound(id))?;
        serde_json::from_str(json).map_err(|e| FormStoreError::DeserializationFailed(e.to_string()))
    }

    async fn exists(&self, id: ConversationId) -> Result<bool, FormStoreError> {
        Ok(self.forms.read().await.contains_key(&id))
    }

    async fn delete(&self, id: ConversationId) -> Result<(), FormStoreError> {
        self.forms.write().await.remove(&id);
        Ok(())
    }
}
