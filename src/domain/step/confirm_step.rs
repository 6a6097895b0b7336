//! ConfirmStep - Yes/no check of earlier answers.

use super::StepResult;
use crate::domain::form::field::Field;
use crate::domain::form::state::{FormState, StepPhase};
use crate::domain::form::{render, FormPrompt, NextStep};
use crate::domain::foundation::{FieldValue, FormData};
use crate::domain::recognition::TermMatch;

/// A yes/no question about answers given so far.
///
/// The answer is never stored in the form data. "Yes" completes the step;
/// "no" leaves it ready to be asked again after the field's next function
/// has sent the user elsewhere.
#[derive(Debug, Clone)]
pub struct ConfirmStep {
    field: Field,
    pattern: String,
}

impl ConfirmStep {
    pub fn new(field: Field, pattern: impl Into<String>) -> Self {
        Self {
            field,
            pattern: pattern.into(),
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn start(&self, state: &mut FormState, values: &[(String, String)]) -> FormPrompt {
        state.set_current_phase(StepPhase::Responding);
        state.step_state = None;
        let args: Vec<(&str, &str)> = values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        FormPrompt::new(render(&self.pattern, &args)).with_buttons(self.field.recognizer().buttons())
    }

    pub fn match_input(&self, input: &str) -> Vec<TermMatch> {
        self.field.recognizer().matches(input, None).collect()
    }

    pub fn process(&self, data: &FormData, state: &mut FormState, matches: &[TermMatch]) -> StepResult {
        let confirmed = matches
            .first()
            .and_then(|m| m.value.field_value())
            .and_then(FieldValue::as_bool)
            .unwrap_or(false);
        state.set_current_phase(if confirmed {
            StepPhase::Completed
        } else {
            StepPhase::Ready
        });
        let next = self.field.next(Some(&FieldValue::Bool(confirmed)), data);
        StepResult::new(true, next)
    }
}

/// Default next function of a confirmation.
pub(crate) fn confirm_next(confirmed: bool, dependencies: &[String]) -> NextStep {
    if confirmed {
        NextStep::Next
    } else {
        NextStep::Named(dependencies.to_vec())
    }
}
