//! Domain layer containing the form engine's types and logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (field values, form data, IDs, errors)
//! - `recognition` - Recognizers and the match analyzer
//! - `form` - Form and field definitions, vocabulary and form state
//! - `step` - Field, confirmation, message and navigation steps

pub mod form;
pub mod foundation;
pub mod recognition;
pub mod step;
