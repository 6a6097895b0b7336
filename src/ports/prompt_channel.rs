//! Prompt Channel Port - Interface for delivering prompts to the user.
//!
//! The dialog never talks to a chat service directly; every prompt goes
//! through this port. Adapters decide how buttons are rendered.

use async_trait::async_trait;

use crate::domain::form::FormPrompt;

/// Errors that can occur while delivering a prompt
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChannelError {
    #[error("Prompt delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Channel closed")]
    Closed,
}

/// Port for sending prompts to the user
#[async_trait]
pub trait PromptChannel: Send + Sync {
    /// Post a prompt
    ///
    /// # Arguments
    /// * `prompt` - The prompt text and buttons
    ///
    /// # Returns
    /// The prompt as delivered, which the dialog re-sends after feedback
    ///
    /// # Errors
    /// Returns `ChannelError` if delivery fails
    async fn post_prompt(&self, prompt: FormPrompt) -> Result<FormPrompt, ChannelError>;
}
