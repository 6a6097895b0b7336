//! Channel Adapters
//!
//! Implementations of the PromptChannel port.
//!
//! - **ConsoleChannel** - Writes prompts and numbered buttons to a terminal
//! - **RecordingChannel** - Keeps every prompt in memory (testing/development)

mod console_channel;
mod recording_channel;

pub use console_channel::{format_prompt, ConsoleChannel};
pub use recording_channel::RecordingChannel;
