//! Persisted, resumable progress through a form.
//!
//! A `FormState` is owned by the host between turns and handed back to the
//! dialog with every inbound message. It carries no references to the form
//! itself, only step indices, so it can be stored as JSON and validated
//! against the form's step count when it is loaded again.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::next_step::NextStep;
use super::prompt::FormPrompt;
use crate::domain::foundation::FieldValue;
use crate::domain::recognition::MatchValue;

/// Current encoding version of [`FormState`].
pub const FORM_STATE_VERSION: u32 = 1;

/// Progress of a single step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    #[default]
    Ready,
    Responding,
    Completed,
}

/// Where a field step is within its own exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStepStatus {
    #[default]
    Prompted,
    Clarifying,
}

/// An input fragment that matched several values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ambiguous {
    /// The words the user wrote.
    pub response: String,
    pub values: Vec<FieldValue>,
}

impl Ambiguous {
    pub fn new(response: impl Into<String>, values: Vec<FieldValue>) -> Self {
        Self {
            response: response.into(),
            values,
        }
    }
}

/// Sub-state of a field step between turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldStepState {
    pub status: FieldStepStatus,
    /// Feedback about words that were not understood.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unmatched: Option<String>,
    /// Values already fixed while clarifying.
    #[serde(default)]
    pub settled: Vec<MatchValue>,
    /// Outstanding ambiguities, resolved front to back.
    #[serde(default)]
    pub clarifications: Vec<Ambiguous>,
}

impl FieldStepState {
    pub fn is_clarifying(&self) -> bool {
        self.status == FieldStepStatus::Clarifying
    }
}

/// Typed per-step sub-state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepState {
    Field(FieldStepState),
}

/// A reply pre-seeded from an extracted entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInput {
    pub step: usize,
    pub text: String,
}

/// Errors encoding or decoding a [`FormState`].
#[derive(Debug, Error)]
pub enum FormStateError {
    #[error("Failed to encode form state: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode form state: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Unsupported form state version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("Form state does not fit the form: {0}")]
    Inconsistent(String),
}

/// Everything needed to resume a form on the next turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub version: u32,
    /// Index of the current step.
    pub step: usize,
    pub phases: Vec<StepPhase>,
    /// Visited step indices for going back.
    pub history: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_state: Option<StepState>,
    /// Pending multi-choice navigation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NextStep>,
    /// Queued entity replies, consumed from the back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_inputs: Option<Vec<FieldInput>>,
    #[serde(default)]
    pub process_inputs: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_prompt: Option<FormPrompt>,
}

impl FormState {
    pub fn new(step_count: usize) -> Self {
        Self {
            version: FORM_STATE_VERSION,
            step: 0,
            phases: vec![StepPhase::Ready; step_count],
            history: Vec::new(),
            step_state: None,
            next: None,
            field_inputs: None,
            process_inputs: false,
            last_prompt: None,
        }
    }

    /// Returns to the first step with every phase Ready.
    pub fn reset(&mut self) {
        *self = Self::new(self.phases.len());
    }

    pub fn step_count(&self) -> usize {
        self.phases.len()
    }

    pub fn phase(&self, step: usize) -> StepPhase {
        self.phases.get(step).copied().unwrap_or_default()
    }

    pub fn set_phase(&mut self, step: usize, phase: StepPhase) {
        if let Some(slot) = self.phases.get_mut(step) {
            *slot = phase;
        }
    }

    pub fn current_phase(&self) -> StepPhase {
        self.phase(self.step)
    }

    pub fn set_current_phase(&mut self, phase: StepPhase) {
        self.set_phase(self.step, phase);
    }

    pub fn field_state(&self) -> Option<&FieldStepState> {
        match &self.step_state {
            Some(StepState::Field(state)) => Some(state),
            None => None,
        }
    }

    /// The field sub-state, created on first use.
    pub fn field_state_mut(&mut self) -> &mut FieldStepState {
        let StepState::Field(state) = self
            .step_state
            .get_or_insert_with(|| StepState::Field(FieldStepState::default()));
        state
    }

    pub fn has_field_inputs(&self) -> bool {
        self.field_inputs.as_ref().map_or(false, |inputs| !inputs.is_empty())
    }

    pub fn encode(&self) -> Result<String, FormStateError> {
        serde_json::to_string(self).map_err(FormStateError::Encode)
    }

    /// Parses and checks a state against a form with `step_count` steps.
    pub fn decode(json: &str, step_count: usize) -> Result<Self, FormStateError> {
        let state: Self = serde_json::from_str(json).map_err(FormStateError::Decode)?;
        state.validate_for(step_count)?;
        Ok(state)
    }

    pub fn validate_for(&self, step_count: usize) -> Result<(), FormStateError> {
        if self.version != FORM_STATE_VERSION {
            return Err(FormStateError::Version {
                found: self.version,
                expected: FORM_STATE_VERSION,
            });
        }
        if self.phases.len() != step_count {
            return Err(FormStateError::Inconsistent(format!(
                "{} phases for {} steps",
                self.phases.len(),
                step_count
            )));
        }
        if step_count > 0 && self.step >= step_count {
            return Err(FormStateError::Inconsistent(format!(
                "step {} out of range",
                self.step
            )));
        }
        if let Some(bad) = self.history.iter().find(|&&index| index >= step_count) {
            return Err(FormStateError::Inconsistent(format!(
                "history entry {} out of range",
                bad
            )));
        }
        let bad_input = self
            .field_inputs
            .iter()
            .flatten()
            .find(|input| input.step >= step_count);
        if let Some(input) = bad_input {
            return Err(FormStateError::Inconsistent(format!(
                "field input for step {} out of range",
                input.step
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_ready_everywhere() {
        let state = FormState::new(3);
        assert_eq!(state.step, 0);
        assert_eq!(state.phases, vec![StepPhase::Ready; 3]);
        assert!(state.history.is_empty());
    }

    #[test]
    fn reset_keeps_step_count() {
        let mut state = FormState::new(2);
        state.step = 1;
        state.history.push(0);
        state.set_phase(0, StepPhase::Completed);
        state.process_inputs = true;
        state.reset();
        assert_eq!(state, FormState::new(2));
    }

    #[test]
    fn phase_out_of_range_is_ready() {
        let state = FormState::new(1);
        assert_eq!(state.phase(5), StepPhase::Ready);
    }

    #[test]
    fn field_state_is_created_on_demand() {
        let mut state = FormState::new(1);
        assert!(state.field_state().is_none());
        state.field_state_mut().status = FieldStepStatus::Clarifying;
        assert!(state.field_state().unwrap().is_clarifying());
    }

    mod persistence {
        use super::*;

        #[test]
        fn encode_preserves_history_and_clarifications() {
            let mut state = FormState::new(3);
            state.step = 2;
            state.history = vec![0, 1];
            state.set_phase(0, StepPhase::Completed);
            state.set_phase(2, StepPhase::Responding);
            let field = state.field_state_mut();
            field.status = FieldStepStatus::Clarifying;
            field.settled.push(MatchValue::NoValue);
            field
                .clarifications
                .push(Ambiguous::new("chicken", vec!["BBQ".into(), "Grilled".into()]));
            state.next = Some(NextStep::Named(vec!["a".into(), "b".into()]));
            state.last_prompt = Some(FormPrompt::new("Which?"));

            let decoded = FormState::decode(&state.encode().unwrap(), 3).unwrap();
            assert_eq!(decoded, state);
        }

        #[test]
        fn decode_rejects_other_versions() {
            let mut state = FormState::new(1);
            state.version = 7;
            let err = FormState::decode(&state.encode().unwrap(), 1).unwrap_err();
            assert!(matches!(err, FormStateError::Version { found: 7, .. }));
        }

        #[test]
        fn decode_rejects_wrong_step_count() {
            let json = FormState::new(2).encode().unwrap();
            let err = FormState::decode(&json, 3).unwrap_err();
            assert!(matches!(err, FormStateError::Inconsistent(_)));
        }

        #[test]
        fn decode_rejects_history_out_of_range() {
            let mut state = FormState::new(2);
            state.history.push(4);
            let err = FormState::decode(&state.encode().unwrap(), 2).unwrap_err();
            assert!(matches!(err, FormStateError::Inconsistent(_)));
        }

        #[test]
        fn decode_rejects_garbage() {
            assert!(matches!(
                FormState::decode("{not json", 1),
                Err(FormStateError::Decode(_))
            ));
        }
    }
}
