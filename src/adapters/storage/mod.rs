//! Storage Adapters
//!
//! Implementations of the FormStateStore port for persisting in-progress forms.
//!
//! ## Available Adapters
//!
//! - **FileFormStore** - Stores each form as a YAML file on disk
//! - **InMemoryFormStore** - Stores forms in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use formflow::adapters::storage::{FileFormStore, InMemoryFormStore};
//!
//! // Durable: file-based storage
//! let store = FileFormStore::new("./data/forms");
//!
//! // Testing: in-memory storage
//! let store = InMemoryFormStore::new();
//! ```

mod file_form_store;
mod in_memory_form_store;

pub use file_form_store::FileFormStore;
pub use in_memory_form_store::InMemoryFormStore;
