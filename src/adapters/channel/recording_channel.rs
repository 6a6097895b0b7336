//! Recording Channel Adapter
//!
//! Keeps every posted prompt in memory. Can be closed to simulate a channel
//! that stops accepting prompts.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::form::FormPrompt;
use crate::ports::{ChannelError, PromptChannel};

/// In-memory prompt channel
#[derive(Debug, Clone, Default)]
pub struct RecordingChannel {
    prompts: Arc<RwLock<Vec<FormPrompt>>>,
    closed: Arc<AtomicBool>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every prompt posted so far, oldest first
    pub async fn prompts(&self) -> Vec<FormPrompt> {
        self.prompts.read().await.clone()
    }

    pub async fn texts(&self) -> Vec<String> {
        self.prompts
            .read()
            .await
            .iter()
            .map(|prompt| prompt.text.clone())
            .collect()
    }

    pub async fn last(&self) -> Option<FormPrompt> {
        self.prompts.read().await.last().cloned()
    }

    /// Removes and returns everything recorded so far
    pub async fn take(&self) -> Vec<FormPrompt> {
        std::mem::take(&mut *self.prompts.write().await)
    }

    /// Makes every later post fail with `ChannelError::Closed`
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PromptChannel for RecordingChannel {
    async fn post_prompt(&self, prompt: FormPrompt) -> Result<FormPrompt, ChannelError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ChannelError::Closed);
        }
        self.prompts.write().await.push(prompt.clone());
        Ok(prompt)
    }
}
