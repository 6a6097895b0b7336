//! NavigationStep - Asks which of several steps to go to next.

use std::sync::Arc;

use super::{Step, StepError, StepResult};
use crate::domain::form::field::{Choice, Field, FieldBuilder};
use crate::domain::form::state::FormState;
use crate::domain::form::{render, FormConfiguration, FormPrompt, NextStep, TemplateUsage};
use crate::domain::foundation::{FieldValue, FormData};
use crate::domain::recognition::TermMatch;

/// Name of the synthesized navigation step.
pub const NAVIGATION_STEP: &str = "__navigate__";

/// Asks which of several steps to go to next.
///
/// Each candidate is offered as "description(current value)" and matched by
/// the terms of its field. Choosing "no preference" continues with the form.
#[derive(Debug, Clone)]
pub struct NavigationStep {
    field: Field,
}

impl NavigationStep {
    pub fn new(
        names: &[String],
        steps: &[Step],
        data: &FormData,
        configuration: Arc<FormConfiguration>,
    ) -> Result<Self, StepError> {
        let choices = names.iter().filter_map(|name| {
            let field = steps.iter().find(|step| step.name() == name)?.field()?;
            let value = field.describe_current(data);
            let description = render(
                configuration.template(TemplateUsage::NavigationFormat),
                &[("field", field.description()), ("value", value.as_str())],
            );
            Some(Choice::new(name.as_str(), description).with_terms(field.terms().to_vec()))
        });
        let field = FieldBuilder::enumeration(NAVIGATION_STEP)
            .description("field")
            .optional()
            .prompt(configuration.template(TemplateUsage::Navigation))
            .choices(choices.collect::<Vec<_>>())
            .build(configuration)?;
        Ok(Self { field })
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn start(&self, data: &FormData) -> FormPrompt {
        self.field.prompt(data)
    }

    pub fn match_input(&self, input: &str) -> Vec<TermMatch> {
        self.field.recognizer().matches(input, None).collect()
    }

    pub fn process(&self, state: &mut FormState, matches: &[TermMatch]) -> StepResult {
        state.next = None;
        let next = match matches.first().and_then(|m| m.value.field_value()) {
            Some(FieldValue::Text(name)) => NextStep::named(name.clone()),
            _ => NextStep::Next,
        };
        StepResult::new(true, next)
    }
}
