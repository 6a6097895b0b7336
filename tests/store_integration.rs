//! Integration tests for stored conversations.
//!
//! `ProcessTurnHandler` loads a conversation's form, runs one turn and
//! stores the result. These tests run the same conversation against the
//! in-memory and file-backed stores.

use std::sync::Arc;

use tempfile::TempDir;

use formflow::adapters::{FileFormStore, InMemoryFormStore, RecordingChannel};
use formflow::application::{
    EntityInput, FormDialog, ProcessTurnCommand, ProcessTurnError, ProcessTurnHandler,
    ProcessTurnResult,
};
use formflow::domain::form::{Choice, FieldBuilder, Form, FormState, StepPhase};
use formflow::domain::foundation::{ConversationId, FieldValue, FormData};
use formflow::ports::{FormStateStore, StoredForm};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn form() -> Arc<Form> {
    Arc::new(
        Form::builder()
            .field(FieldBuilder::enumeration("Size").choices(["Large", "Small"].map(Choice::named)))
            .field(FieldBuilder::text("Name"))
            .build()
            .unwrap(),
    )
}

fn handler(store: Arc<dyn FormStateStore>) -> (ProcessTurnHandler, RecordingChannel) {
    let channel = RecordingChannel::new();
    let dialog = FormDialog::new(form(), Arc::new(channel.clone()));
    (ProcessTurnHandler::new(Arc::new(dialog), store), channel)
}

fn opening(id: ConversationId) -> ProcessTurnCommand {
    ProcessTurnCommand {
        conversation_id: id,
        text: None,
        entities: Vec::new(),
        data: FormData::new(),
    }
}

/// Runs a full conversation and checks what the store holds along the way.
async fn run_conversation(store: Arc<dyn FormStateStore>) {
    let (handler, channel) = handler(store.clone());
    let id = ConversationId::new();

    let result = handler.handle(opening(id)).await.unwrap();
    assert!(matches!(result, ProcessTurnResult::AwaitingInput { .. }));
    assert!(store.exists(id).await.unwrap());
    assert_eq!(channel.texts().await, vec!["Please select size: Large or Small"]);

    handler
        .handle(ProcessTurnCommand::message(id, "large"))
        .await
        .unwrap();
    let stored = store.load(id).await.unwrap();
    assert_eq!(stored.data.get("Size"), Some(&FieldValue::from("Large")));
    assert_eq!(stored.state.step, 1);
    assert_eq!(stored.state.phase(0), StepPhase::Completed);

    let result = handler
        .handle(ProcessTurnCommand::message(id, "Ann"))
        .await
        .unwrap();
    match result {
        ProcessTurnResult::Completed { data } => {
            assert_eq!(data.get("Name"), Some(&FieldValue::from("Ann")));
        }
        other => panic!("expected completion, got {other:?}"),
    }
    assert!(!store.exists(id).await.unwrap());
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn conversation_runs_against_in_memory_store() {
    run_conversation(Arc::new(InMemoryFormStore::new())).await;
}

#[tokio::test]
async fn conversation_runs_against_file_store() {
    let dir = TempDir::new().unwrap();
    run_conversation(Arc::new(FileFormStore::new(dir.path()))).await;
}

#[tokio::test]
async fn conversation_resumes_with_a_new_handler() {
    let dir = TempDir::new().unwrap();
    let id = ConversationId::new();

    let (first, _) = handler(Arc::new(FileFormStore::new(dir.path())));
    first.handle(opening(id)).await.unwrap();
    first
        .handle(ProcessTurnCommand::message(id, "small"))
        .await
        .unwrap();
    drop(first);

    let (second, channel) = handler(Arc::new(FileFormStore::new(dir.path())));
    let result = second
        .handle(ProcessTurnCommand::message(id, "Bo"))
        .await
        .unwrap();

    match result {
        ProcessTurnResult::Completed { data } => {
            assert_eq!(data.get("Size"), Some(&FieldValue::from("Small")));
            assert_eq!(data.get("Name"), Some(&FieldValue::from("Bo")));
        }
        other => panic!("expected completion, got {other:?}"),
    }
    assert!(channel.texts().await.is_empty());
}

#[tokio::test]
async fn entities_are_applied_on_the_opening_turn() {
    let store = Arc::new(InMemoryFormStore::new());
    let (handler, channel) = handler(store.clone());
    let id = ConversationId::new();
    let command = ProcessTurnCommand {
        entities: vec![EntityInput::new("Size", "small")],
        ..opening(id)
    };

    handler.handle(command).await.unwrap();

    let stored = store.load(id).await.unwrap();
    assert_eq!(stored.data.get("Size"), Some(&FieldValue::from("Small")));
    assert_eq!(channel.texts().await, vec!["Please enter name"]);
}

#[tokio::test]
async fn quitting_removes_the_stored_form() {
    let store = Arc::new(InMemoryFormStore::new());
    let (handler, _) = handler(store.clone());
    let id = ConversationId::new();
    handler.handle(opening(id)).await.unwrap();

    let result = handler
        .handle(ProcessTurnCommand::message(id, "quit"))
        .await
        .unwrap();

    match result {
        ProcessTurnResult::Canceled(canceled) => {
            assert!(canceled.is_quit());
            assert_eq!(canceled.last_step, "Size");
        }
        other => panic!("expected cancellation, got {other:?}"),
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn stored_state_for_another_form_is_rejected() {
    let store = Arc::new(InMemoryFormStore::new());
    let id = ConversationId::new();
    store
        .save(id, &StoredForm::new(FormData::new(), FormState::new(7)))
        .await
        .unwrap();
    let (handler, _) = handler(store.clone());

    let result = handler
        .handle(ProcessTurnCommand::message(id, "large"))
        .await;

    assert!(matches!(result, Err(ProcessTurnError::State(_))));
    assert!(store.exists(id).await.unwrap());
}
