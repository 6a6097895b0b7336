//! Step module - The units a form walks through.
//!
//! # Module Organization
//!
//! - `field_step` - Asks for one field, including clarification of ambiguity
//! - `confirm_step` - Yes/no confirmation of earlier answers
//! - `message_step` - Informational message that expects no reply
//! - `navigation_step` - Asks which of several steps to go to
//!
//! Every variant is driven through the same operations on [`Step`].

mod confirm_step;
mod field_step;
mod message_step;
mod navigation_step;

pub(crate) use confirm_step::confirm_next;
pub use confirm_step::ConfirmStep;
pub use field_step::FieldStep;
pub use message_step::{MessageSource, MessageStep};
pub use navigation_step::{NavigationStep, NAVIGATION_STEP};

use thiserror::Error;

use crate::domain::form::field::{Field, FieldDefineError};
use crate::domain::form::state::FormState;
use crate::domain::form::{
    render, FormBuildError, FormConfiguration, FormPrompt, HookError, NextStep, TemplateUsage,
};
use crate::domain::foundation::FormData;
use crate::domain::recognition::TermMatch;

/// Failure inside a step operation.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Build(#[from] FormBuildError),
}

impl From<FieldDefineError> for StepError {
    fn from(err: FieldDefineError) -> Self {
        match err {
            FieldDefineError::Hook(err) => StepError::Hook(err),
            FieldDefineError::Build(err) => StepError::Build(err),
        }
    }
}

/// Outcome of processing a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub success: bool,
    pub next: NextStep,
    /// Shown before any prompt.
    pub feedback: Option<FormPrompt>,
    /// A follow-up question, e.g. a clarification.
    pub prompt: Option<FormPrompt>,
}

impl StepResult {
    pub fn new(success: bool, next: NextStep) -> Self {
        Self {
            success,
            next,
            feedback: None,
            prompt: None,
        }
    }
}

/// One step of a form.
#[derive(Debug, Clone)]
pub enum Step {
    Field(FieldStep),
    Confirm(ConfirmStep),
    Message(MessageStep),
    Navigation(NavigationStep),
}

impl Step {
    pub fn name(&self) -> &str {
        match self {
            Step::Field(step) => step.field().name(),
            Step::Confirm(step) => step.field().name(),
            Step::Message(step) => step.name(),
            Step::Navigation(_) => NAVIGATION_STEP,
        }
    }

    /// The field behind the step, if it has one.
    pub fn field(&self) -> Option<&Field> {
        match self {
            Step::Field(step) => Some(step.field()),
            Step::Confirm(step) => Some(step.field()),
            Step::Navigation(step) => Some(step.field()),
            Step::Message(_) => None,
        }
    }

    pub fn dependencies(&self) -> &[String] {
        match self {
            Step::Field(step) => step.field().dependencies(),
            Step::Confirm(step) => step.field().dependencies(),
            Step::Message(step) => step.dependencies(),
            Step::Navigation(_) => &[],
        }
    }

    pub fn is_active(&self, data: &FormData) -> bool {
        match self {
            Step::Field(step) => step.is_active(data),
            Step::Confirm(step) => step.field().is_active(data),
            Step::Message(step) => step.is_active(data),
            Step::Navigation(_) => true,
        }
    }

    /// Prepares the step for this pass; `false` means skip it.
    pub async fn define(&mut self, data: &FormData) -> Result<bool, StepError> {
        match self {
            Step::Field(step) => step.define(data).await,
            Step::Message(step) => step.define(data).await,
            Step::Confirm(_) | Step::Navigation(_) => Ok(true),
        }
    }

    /// First prompt of the step. `values` are the described field values.
    pub fn start(
        &self,
        data: &FormData,
        state: &mut FormState,
        values: &[(String, String)],
    ) -> FormPrompt {
        match self {
            Step::Field(step) => step.start(data, state),
            Step::Confirm(step) => step.start(state, values),
            Step::Message(step) => step.start(values),
            Step::Navigation(step) => step.start(data),
        }
    }

    pub fn match_input(
        &self,
        data: &FormData,
        state: &FormState,
        input: &str,
    ) -> Result<Vec<TermMatch>, StepError> {
        match self {
            Step::Field(step) => step.match_input(data, state, input),
            Step::Confirm(step) => Ok(step.match_input(input)),
            Step::Navigation(step) => Ok(step.match_input(input)),
            Step::Message(_) => Ok(Vec::new()),
        }
    }

    pub async fn process(
        &self,
        data: &mut FormData,
        state: &mut FormState,
        input: &str,
        matches: &[TermMatch],
    ) -> Result<StepResult, StepError> {
        match self {
            Step::Field(step) => step.process(data, state, input, matches).await,
            Step::Confirm(step) => Ok(step.process(data, state, matches)),
            Step::Navigation(step) => Ok(step.process(state, matches)),
            Step::Message(_) => Ok(StepResult::new(true, NextStep::Next)),
        }
    }

    pub fn not_understood(
        &self,
        data: &FormData,
        state: &FormState,
        input: &str,
    ) -> Result<FormPrompt, StepError> {
        match self {
            Step::Field(step) => step.not_understood(data, state, input),
            Step::Confirm(step) => Ok(not_understood(step.field(), data, input)),
            Step::Navigation(step) => Ok(not_understood(step.field(), data, input)),
            Step::Message(_) => Ok(FormPrompt::default()),
        }
    }

    pub fn help(
        &self,
        data: &FormData,
        state: &FormState,
        command_help: &str,
    ) -> Result<FormPrompt, StepError> {
        match self {
            Step::Field(step) => step.help(data, state, command_help),
            Step::Confirm(step) => Ok(help(
                step.field(),
                TemplateUsage::HelpConfirm,
                data,
                command_help,
            )),
            Step::Navigation(step) => Ok(help(
                step.field(),
                TemplateUsage::HelpNavigation,
                data,
                command_help,
            )),
            Step::Message(_) => Ok(FormPrompt::default()),
        }
    }

    /// Handles "go back" inside the step; `true` when it was consumed.
    pub fn back(&self, data: &mut FormData, state: &mut FormState) -> bool {
        match self {
            Step::Field(step) => step.back(data, state),
            _ => false,
        }
    }

    pub fn in_clarify(&self, state: &FormState) -> bool {
        matches!(self, Step::Field(_)) && state.field_state().map_or(false, |s| s.is_clarifying())
    }
}

fn not_understood(field: &Field, data: &FormData, input: &str) -> FormPrompt {
    FormPrompt::new(field.render(
        field.template(TemplateUsage::NotUnderstood),
        data,
        &[("input", input)],
    ))
}

fn help(field: &Field, usage: TemplateUsage, data: &FormData, command_help: &str) -> FormPrompt {
    let help = field.recognizer().help(field.value(data));
    FormPrompt::new(field.render(
        field.template(usage),
        data,
        &[("help", help.as_str()), ("commands", command_help)],
    ))
}

/// Described values of every field step that has a value, plus `*` for a
/// status summary of all of them.
pub fn described_values(
    steps: &[Step],
    data: &FormData,
    configuration: &FormConfiguration,
) -> Vec<(String, String)> {
    let mut values = Vec::new();
    let mut summary = Vec::new();
    for step in steps {
        let (Step::Field(field_step), true) = (step, step.is_active(data)) else {
            continue;
        };
        let field = field_step.field();
        if field.is_unknown(data) {
            continue;
        }
        let value = field.describe_current(data);
        summary.push(render(
            configuration.template(TemplateUsage::StatusFormat),
            &[("field", field.description()), ("value", value.as_str())],
        ));
        values.push((field.name().to_string(), value));
    }
    values.push(("*".to_string(), summary.join("\n")));
    values
}
