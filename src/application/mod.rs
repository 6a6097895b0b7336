//! Application layer - Dialog orchestration and turn handlers.
//!
//! This layer drives the domain's steps through a conversation and
//! coordinates between ports: prompt delivery, host hooks and storage.

pub mod handlers;

pub use handlers::{
    CancelReason, EntityInput, FormCanceled, FormDialog, FormFault, ProcessTurnCommand,
    ProcessTurnError, ProcessTurnHandler, ProcessTurnResult, TurnOutcome,
};
