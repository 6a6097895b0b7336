//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the form engine and the outside world. Adapters implement these ports.
//!
//! ## Dialog Ports
//!
//! - `PromptChannel` - Delivers prompts to the user
//! - `CompletionHandler` - Receives the data of a finished form
//! - `FormPrompter` - Optional form-level prompt delivery
//!
//! ## Storage Ports
//!
//! - `FormStateStore` - Persists data and form state between turns
//!
//! Field-level hooks (`FieldValidator`, `FieldDefiner`) live with the field
//! definitions in `domain::form` and are re-exported here.

mod form_hooks;
mod form_state_store;
mod prompt_channel;

pub use crate::domain::form::{FieldDefiner, FieldValidator, MessageGenerator};
pub use form_hooks::{CompletionHandler, FormPrompter};
pub use form_state_store::{FormStateStore, FormStoreError, StoredForm};
pub use prompt_channel::{ChannelError, PromptChannel};
