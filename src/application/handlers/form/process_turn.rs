//! ProcessTurnHandler - Runs one conversational turn against a stored form.

use std::sync::Arc;

use tracing::{debug, info};

use super::errors::FormCanceled;
use super::form_dialog::{EntityInput, FormDialog, TurnOutcome};
use crate::domain::form::{FormState, FormStateError};
use crate::domain::foundation::{ConversationId, FormData};
use crate::ports::{FormStateStore, FormStoreError, StoredForm};

/// Command carrying one inbound message.
#[derive(Debug, Clone)]
pub struct ProcessTurnCommand {
    pub conversation_id: ConversationId,
    pub text: Option<String>,
    /// Replies extracted elsewhere; only used when the form starts.
    pub entities: Vec<EntityInput>,
    /// Initial data; only used when the form starts.
    pub data: FormData,
}

impl ProcessTurnCommand {
    pub fn message(conversation_id: ConversationId, text: impl Into<String>) -> Self {
        Self {
            conversation_id,
            text: Some(text.into()),
            entities: Vec::new(),
            data: FormData::new(),
        }
    }
}

/// Result of a turn.
#[derive(Debug)]
pub enum ProcessTurnResult {
    /// The form was saved and waits for the next message.
    AwaitingInput { data: FormData },
    Completed { data: FormData },
    /// The user quit or the turn failed; nothing is stored any more.
    Canceled(FormCanceled),
}

/// Errors that prevent a turn from running.
#[derive(Debug, thiserror::Error)]
pub enum ProcessTurnError {
    #[error(transparent)]
    Store(#[from] FormStoreError),

    #[error("Stored form no longer fits: {0}")]
    State(#[from] FormStateError),
}

/// Handler for conversational turns.
pub struct ProcessTurnHandler {
    dialog: Arc<FormDialog>,
    store: Arc<dyn FormStateStore>,
}

impl ProcessTurnHandler {
    pub fn new(dialog: Arc<FormDialog>, store: Arc<dyn FormStateStore>) -> Self {
        Self { dialog, store }
    }

    pub async fn handle(
        &self,
        cmd: ProcessTurnCommand,
    ) -> Result<ProcessTurnResult, ProcessTurnError> {
        let id = cmd.conversation_id;
        let step_count = self.dialog.form().steps().len();

        // 1. Resume the stored form, or start a new one
        let (outcome, state) = if self.store.exists(id).await? {
            let stored = self.store.load(id).await?;
            stored.state.validate_for(step_count)?;
            debug!(conversation_id = %id, step = stored.state.step, "Resuming form");
            let mut state = stored.state;
            let outcome = self
                .dialog
                .message_received(stored.data, &mut state, cmd.text.as_deref())
                .await;
            (outcome, state)
        } else {
            info!(conversation_id = %id, "Starting new form");
            let mut state = FormState::new(step_count);
            let started = self.dialog.start(cmd.data, &mut state, &cmd.entities).await;
            let outcome = match started {
                Ok(TurnOutcome::AwaitingInput(data))
                    if !self.dialog.form().options().prompt_in_start =>
                {
                    self.dialog
                        .message_received(data, &mut state, cmd.text.as_deref())
                        .await
                }
                other => other,
            };
            (outcome, state)
        };

        // 2. Keep the form while it waits, drop it once it ends
        match outcome {
            Ok(TurnOutcome::AwaitingInput(data)) => {
                self.store
                    .save(id, &StoredForm::new(data.clone(), state))
                    .await?;
                Ok(ProcessTurnResult::AwaitingInput { data })
            }
            Ok(TurnOutcome::Completed(data)) => {
                self.store.delete(id).await?;
                info!(conversation_id = %id, "Form completed");
                Ok(ProcessTurnResult::Completed { data })
            }
            Err(canceled) => {
                self.store.delete(id).await?;
                info!(conversation_id = %id, quit = canceled.is_quit(), "Form canceled");
                Ok(ProcessTurnResult::Canceled(canceled))
            }
        }
    }
}
