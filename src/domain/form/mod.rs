//! Form module - Declaring forms and tracking progress through them.
//!
//! # Module Organization
//!
//! - `command` - Built-in commands (back, help, quit, reset, status)
//! - `configuration` - Vocabulary, templates and form options
//! - `prompt` - Prompts, buttons and the template renderer
//! - `next_step` - Directives for where a form goes next
//! - `hooks` - Validator, definer and message generator extension points
//! - `field` - Field declarations and compiled fields
//! - `form` - Form builder and the immutable form
//! - `state` - Persisted progress through a form
//! - `errors` - Build errors

mod command;
mod configuration;
mod errors;
pub mod field;
mod form;
mod hooks;
mod next_step;
mod prompt;
pub mod state;

pub use command::FormCommand;
pub use configuration::{CommandDescription, FormConfiguration, FormOptions, TemplateUsage};
pub use errors::FormBuildError;
pub use field::{Choice, FeedbackOptions, Field, FieldBuilder, FieldKind};
pub use form::{Form, FormBuilder};
pub use hooks::{
    DefineFn, FieldDefiner, FieldValidator, HookError, MessageFn, MessageGenerator, ValidateFn,
    ValidateResult,
};
pub use next_step::NextStep;
pub use prompt::{render, FormPrompt, PromptButton};
pub use state::{FormState, FormStateError, StepPhase};
