//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod form;

pub use form::{
    // Dialog
    EntityInput, FormDialog, TurnOutcome,
    // Commands and Results
    ProcessTurnCommand, ProcessTurnError, ProcessTurnHandler, ProcessTurnResult,
    // Errors
    CancelReason, FormCanceled, FormFault,
};
