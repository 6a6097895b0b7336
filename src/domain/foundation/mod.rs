//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the form domain.

mod errors;
mod ids;
mod value;

pub use errors::ValidationError;
pub use ids::ConversationId;
pub use value::{FieldValue, FormData};
