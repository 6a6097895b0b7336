//! Form command handlers.
//!
//! - `form_dialog` - The turn controller that walks a form's steps
//! - `transition` - Step selection for each navigation directive
//! - `commands` - Built-in commands (back, help, quit, reset, status)
//! - `process_turn` - Loads, runs and stores a conversation's form

mod commands;
mod errors;
mod form_dialog;
mod process_turn;
mod transition;

pub use errors::{CancelReason, FormCanceled, FormFault};
pub use form_dialog::{EntityInput, FormDialog, TurnOutcome};
pub use process_turn::{
    ProcessTurnCommand, ProcessTurnError, ProcessTurnHandler, ProcessTurnResult,
};
