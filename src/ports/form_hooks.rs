//! Form Hooks Port - Host callbacks invoked by the dialog.
//!
//! - `CompletionHandler` receives the data of a finished form
//! - `FormPrompter` can rewrite or route prompts before delivery

use async_trait::async_trait;

use super::prompt_channel::{ChannelError, PromptChannel};
use crate::domain::form::{Field, FormPrompt, HookError};
use crate::domain::foundation::FormData;

/// Port called once a form completes
#[async_trait]
pub trait CompletionHandler: Send + Sync {
    /// Handle the completed form data
    ///
    /// # Errors
    /// Returns `HookError::Completion` if the host could not accept the data
    async fn on_completion(&self, data: &FormData) -> Result<(), HookError>;
}

/// Port for form-level prompt delivery
///
/// Without a prompter the dialog posts prompts straight to the channel.
#[async_trait]
pub trait FormPrompter: Send + Sync {
    /// Deliver a prompt
    ///
    /// # Arguments
    /// * `channel` - Where prompts are posted
    /// * `prompt` - The prompt about to be sent
    /// * `data` - Current form data
    /// * `field` - The field being asked about, if any
    ///
    /// # Returns
    /// The prompt as delivered
    async fn prompt(
        &self,
        channel: &dyn PromptChannel,
        prompt: FormPrompt,
        data: &FormData,
        field: Option<&Field>,
    ) -> Result<FormPrompt, ChannelError>;
}
