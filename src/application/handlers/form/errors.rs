//! Errors raised while running a form turn.

use thiserror::Error;

use crate::domain::form::{FormStateError, HookError};
use crate::domain::foundation::FormData;
use crate::domain::step::StepError;
use crate::ports::ChannelError;

/// Anything that can go wrong inside a turn.
#[derive(Debug, Error)]
pub enum FormFault {
    #[error("Step '{0}' does not exist")]
    StepOutOfRange(String),

    #[error("Form state does not match the form: {0}")]
    StateMismatch(String),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    State(#[from] FormStateError),

    #[error(transparent)]
    Step(#[from] StepError),
}

/// Why a form ended without completing.
#[derive(Debug)]
pub enum CancelReason {
    /// The user quit, or backed up past the first step.
    Quit,
    Fault(FormFault),
}

/// A form ended without completing.
#[derive(Debug, Error)]
#[error("Form canceled at step '{last_step}'")]
pub struct FormCanceled {
    /// Data gathered before the form ended.
    pub data: FormData,
    pub last_step: String,
    /// Names of the steps that were completed.
    pub completed: Vec<String>,
    pub reason: CancelReason,
}

impl FormCanceled {
    pub fn is_quit(&self) -> bool {
        matches!(self.reason, CancelReason::Quit)
    }

    pub fn fault(&self) -> Option<&FormFault> {
        match &self.reason {
            CancelReason::Fault(fault) => Some(fault),
            CancelReason::Quit => None,
        }
    }
}
