//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the form engine to external systems:
//! - `channel` - Prompt delivery (console, in-memory recording)
//! - `storage` - Form persistence (YAML files, in-memory)

pub mod channel;
pub mod storage;

pub use channel::{ConsoleChannel, RecordingChannel};
pub use storage::{FileFormStore, InMemoryFormStore};
