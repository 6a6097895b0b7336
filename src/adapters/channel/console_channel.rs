//! Console Channel Adapter
//!
//! Writes prompts to a terminal (or any async writer), listing buttons as
//! numbered options underneath the text.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::domain::form::FormPrompt;
use crate::ports::{ChannelError, PromptChannel};

/// Renders a prompt as console text.
pub fn format_prompt(prompt: &FormPrompt) -> String {
    let mut text = prompt.text.clone();
    for (index, button) in prompt.buttons.iter().enumerate() {
        text.push_str(&format!("\n  {}. {}", index + 1, button.title));
    }
    text.push('\n');
    text
}

/// Prompt channel writing to a terminal
pub struct ConsoleChannel {
    out: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl ConsoleChannel {
    /// Channel writing to standard output
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    pub fn new<W>(out: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }
}

#[async_trait]
impl PromptChannel for ConsoleChannel {
    async fn post_prompt(&self, prompt: FormPrompt) -> Result<FormPrompt, ChannelError> {
        let text = format_prompt(&prompt);
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes())
            .await
            .map_err(|e| ChannelError::DeliveryFailed(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| ChannelError::DeliveryFailed(e.to_string()))?;
        Ok(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::PromptButton;

    #[test]
    fn plain_prompt_is_its_text() {
        assert_eq!(format_prompt(&FormPrompt::new("Please enter name")), "Please enter name\n");
    }

    #[test]
    fn buttons_are_numbered() {
        let prompt = FormPrompt::new("Please select size").with_buttons(vec![
            PromptButton::new("Large", "Large"),
            PromptButton::new("Small", "Small"),
        ]);

        assert_eq!(
            format_prompt(&prompt),
            "Please select size\n  1. Large\n  2. Small\n"
        );
    }

    #[tokio::test]
    async fn writes_to_the_given_writer() {
        let (client, mut server) = tokio::io::duplex(256);
        let channel = ConsoleChannel::new(client);

        channel.post_prompt(FormPrompt::new("Hello")).await.unwrap();
        drop(channel);

        let mut written = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut server, &mut written)
            .await
            .unwrap();
        assert_eq!(written, "Hello\n");
    }
}
