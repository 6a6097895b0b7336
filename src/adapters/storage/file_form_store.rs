//! File-based Form Store Adapter
//!
//! Stores each conversation's form data and state as a YAML file on disk,
//! one directory per conversation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::foundation::ConversationId;
use crate::ports::{FormStateStore, FormStoreError, StoredForm};

/// File-based storage for in-progress forms
#[derive(Debug, Clone)]
pub struct FileFormStore {
    base_path: PathBuf,
}

impl FileFormStore {
    /// Create a new file store with a base directory
    ///
    /// # Example
    /// ```ignore
    /// let store = FileFormStore::new("./data/forms");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn conversation_dir(&self, id: ConversationId) -> PathBuf {
        self.base_path.join(id.to_string())
    }

    fn form_file_path(&self, id: ConversationId) -> PathBuf {
        self.conversation_dir(id).join("form.yaml")
    }

    async fn ensure_dir(&self, path: &Path) -> Result<(), FormStoreError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| FormStoreError::IoError(e.to_string()))
    }
}

#[async_trait]
impl FormStateStore for FileFormStore {
    async fn save(&self, id: ConversationId, form: &StoredForm) -> Result<(), FormStoreError> {
        self.ensure_dir(&self.conversation_dir(id)).await?;

        let yaml = serde_yaml::to_string(form)
            .map_err(|e| FormStoreError::SerializationFailed(e.to_string()))?;

        fs::write(self.form_file_path(id), yaml)
            .await
            .map_err(|e| FormStoreError::IoError(e.to_string()))
    }

    async fn load(&self, id: ConversationId) -> Result<StoredForm, FormStoreError> {
        let file_path = self.form_file_path(id);
        if !file_path.exists() {
            return Err(FormStoreError::NotFound(id));
        }

        let yaml = fs::read_to_string(&file_path)
            .await
            .map_err(|e| FormStoreError::IoError(e.to_string()))?;

        serde_yaml::from_str(&yaml).map_err(|e| FormStoreError::DeserializationFailed(e.to_string()))
    }

    async fn exists(&self, id: ConversationId) -> Result<bool, FormStoreError> {
        Ok(self.form_file_path(id).exists())
    }

    async fn delete(&self, id: ConversationId) -> Result<(), FormStoreError> {
        let dir = self.conversation_dir(id);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| FormStoreError::IoError(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::state::{Ambiguous, FieldStepState, FieldStepStatus, StepState};
    use crate::domain::form::{FormPrompt, FormState, NextStep, PromptButton, StepPhase};
    use crate::domain::foundation::{FieldValue, FormData};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn test_form() -> StoredForm {
        let when = NaiveDate::from_ymd_opt(2026, 7, 3)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        let data = FormData::new()
            .with("Size", "Large")
            .with("Count", 2i64)
            .with("Delivery", when)
            .with(
                "Toppings",
                FieldValue::List(vec![FieldValue::from("Ham"), FieldValue::from("Olives")]),
            );
        let mut state = FormState::new(4);
        state.step = 2;
        state.set_phase(0, StepPhase::Completed);
        state.set_phase(2, StepPhase::Responding);
        state.history = vec![0];
        state.next = Some(NextStep::Named(vec!["Size".into(), "Count".into()]));
        state.step_state = Some(StepState::Field(FieldStepState {
            status: FieldStepStatus::Clarifying,
            unmatched: None,
            settled: Vec::new(),
            clarifications: vec![Ambiguous::new(
                "chicken",
                vec![FieldValue::from("Chicken"), FieldValue::from("BBQ Chicken")],
            )],
        }));
        state.last_prompt = Some(
            FormPrompt::new("Please select toppings").with_buttons(vec![PromptButton::new("Ham", "Ham")]),
        );
        StoredForm::new(data, state)
    }

    #[tokio::test]
    async fn test_file_store_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileFormStore::new(temp_dir.path());
        let id = ConversationId::new();
        let form = test_form();

        store.save(id, &form).await.unwrap();
        let loaded = store.load(id).await.unwrap();

        assert_eq!(loaded, form);
    }

    #[tokio::test]
    async fn test_file_store_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileFormStore::new(temp_dir.path());

        let result = store.load(ConversationId::new()).await;

        assert!(matches!(result, Err(FormStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_file_store_exists_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileFormStore::new(temp_dir.path());
        let id = ConversationId::new();

        assert!(!store.exists(id).await.unwrap());
        store.save(id, &test_form()).await.unwrap();
        assert!(store.exists(id).await.unwrap());

        store.delete(id).await.unwrap();
        assert!(!store.exists(id).await.unwrap());
        assert!(!store.conversation_dir(id).exists());
    }

    #[tokio::test]
    async fn test_file_store_delete_missing_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileFormStore::new(temp_dir.path());

        assert!(store.delete(ConversationId::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_file_store_overwrites_on_save() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileFormStore::new(temp_dir.path());
        let id = ConversationId::new();
        let mut form = test_form();

        store.save(id, &form).await.unwrap();
        form.data.set("Size", "Small");
        form.state.step = 3;
        store.save(id, &form).await.unwrap();

        let loaded = store.load(id).await.unwrap();
        assert_eq!(loaded.data.get("Size"), Some(&FieldValue::from("Small")));
        assert_eq!(loaded.state.step, 3);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_fails_to_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileFormStore::new(temp_dir.path());
        let id = ConversationId::new();
        std::fs::create_dir_all(store.conversation_dir(id)).unwrap();
        std::fs::write(store.form_file_path(id), "state: [unclosed").unwrap();

        let result = store.load(id).await;

        assert!(matches!(result, Err(FormStoreError::DeserializationFailed(_))));
    }
}
