//! FieldStep - Asks for one field and clarifies ambiguous replies.
//!
//! A reply is recognized, validated and committed. When it matches several
//! values the step keeps what is settled and asks about the rest.

use tracing::debug;

use super::{help, StepError, StepResult};
use crate::domain::form::field::{FeedbackOptions, Field};
use crate::domain::form::state::{
    Ambiguous, FieldStepState, FieldStepStatus, FormState, StepPhase, StepState,
};
use crate::domain::form::{FormBuildError, FormPrompt, NextStep, TemplateUsage, ValidateResult};
use crate::domain::foundation::{FieldValue, FormData};
use crate::domain::recognition::language::{non_noise_words, word_break};
use crate::domain::recognition::{
    grouped_matches, highest_confidence, unmatched, EnumChoice, EnumerationOptions, MatchGroup,
    MatchValue, Recognize, RecognizeEnumeration, TermMatch,
};

/// Asks for the value of one field.
#[derive(Debug, Clone)]
pub struct FieldStep {
    field: Field,
    /// Set when the definer skipped the field for this pass.
    undefined: bool,
}

impl FieldStep {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            undefined: false,
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn is_active(&self, data: &FormData) -> bool {
        !self.undefined && self.field.is_active(data)
    }

    pub async fn define(&mut self, data: &FormData) -> Result<bool, StepError> {
        if !self.field.has_definer() {
            return Ok(true);
        }
        match self.field.redefine(data).await? {
            Some(field) => {
                self.field = field;
                Ok(true)
            }
            None => {
                debug!(step = %self.field.name(), "Field skipped by definer");
                self.undefined = true;
                Ok(false)
            }
        }
    }

    pub fn start(&self, data: &FormData, state: &mut FormState) -> FormPrompt {
        state.set_current_phase(StepPhase::Responding);
        state.step_state = Some(StepState::Field(FieldStepState::default()));
        self.field.prompt(data)
    }

    pub fn match_input(
        &self,
        data: &FormData,
        state: &FormState,
        input: &str,
    ) -> Result<Vec<TermMatch>, StepError> {
        match state.field_state() {
            Some(field_state) if field_state.is_clarifying() => {
                let Some(clarify) = field_state.clarifications.first() else {
                    return Ok(Vec::new());
                };
                let recognizer = self.clarify_recognizer(clarify)?;
                let matches: Vec<TermMatch> = recognizer.matches(input, None).collect();
                Ok(highest_confidence(&matches))
            }
            _ => Ok(self
                .field
                .recognizer()
                .matches(input, self.field.value(data))
                .collect()),
        }
    }

    pub async fn process(
        &self,
        data: &mut FormData,
        state: &mut FormState,
        input: &str,
        matches: &[TermMatch],
    ) -> Result<StepResult, StepError> {
        let mut field_state = state.field_state().cloned().unwrap_or_default();
        let mut feedback = ValidateResult::valid();
        let mut prompt = None;

        if field_state.is_clarifying() {
            match matches {
                [only] if !field_state.clarifications.is_empty() => {
                    let resolved = field_state.clarifications.remove(0);
                    field_state.settled.push(only.value.clone());
                    if field_state.clarifications.is_empty() {
                        let value = self.settled_value(&field_state.settled);
                        feedback = self.set_value(data, state, value).await?;
                        if !feedback.is_valid {
                            field_state.settled.pop();
                            field_state.clarifications.insert(0, resolved);
                        }
                    } else {
                        prompt = Some(self.clarify_prompt(data, &field_state)?);
                    }
                }
                [] | [_] => {}
                several => {
                    if let Some(clarify) = field_state.clarifications.first_mut() {
                        clarify.values = distinct_values(several);
                    }
                    prompt = Some(self.clarify_prompt(data, &field_state)?);
                }
            }
        } else {
            match matches {
                [] => {}
                [only] => {
                    let value = self.response(only.value.clone());
                    feedback = self.set_value(data, state, value).await?;
                    if !feedback.is_valid && !feedback.choices.is_empty() {
                        field_state.status = FieldStepStatus::Clarifying;
                        field_state.settled.clear();
                        field_state.clarifications = vec![Ambiguous::new(
                            only.text(input).trim(),
                            std::mem::take(&mut feedback.choices),
                        )];
                        self.field.set_unknown(data);
                        feedback = ValidateResult::valid();
                        prompt = Some(self.clarify_prompt(data, &field_state)?);
                    }
                }
                several => {
                    let (settled, ambiguous) = self.split_groups(input, several);
                    if ambiguous.is_empty() {
                        let value = self.settled_value(&settled);
                        feedback = self.set_value(data, state, value).await?;
                    } else {
                        debug!(
                            step = %self.field.name(),
                            ambiguities = ambiguous.len(),
                            "Clarification needed"
                        );
                        field_state.status = FieldStepStatus::Clarifying;
                        field_state.settled = settled;
                        field_state.clarifications = ambiguous;
                        self.field.set_unknown(data);
                        prompt = Some(self.clarify_prompt(data, &field_state)?);
                    }
                }
            }
            field_state.unmatched = self.unmatched_feedback(input, matches);
        }

        let completed = state.current_phase() == StepPhase::Completed;
        let feedback_prompt = if completed {
            let prompt = match (feedback.feedback.take(), &field_state.unmatched) {
                (Some(text), _) if !text.is_empty() => Some(FormPrompt::new(text)),
                (_, Some(words)) => Some(self.understood_prompt(data, words)),
                _ => None,
            };
            state.step_state = None;
            prompt
        } else {
            let prompt = feedback
                .feedback
                .take()
                .filter(|text| !text.is_empty())
                .map(FormPrompt::new);
            state.step_state = Some(StepState::Field(field_state));
            prompt
        };

        let next = if completed {
            self.field.next(self.field.value(data), data)
        } else {
            NextStep::Next
        };
        Ok(StepResult {
            success: feedback.is_valid,
            next,
            feedback: feedback_prompt,
            prompt,
        })
    }

    pub fn not_understood(
        &self,
        data: &FormData,
        _state: &FormState,
        input: &str,
    ) -> Result<FormPrompt, StepError> {
        Ok(FormPrompt::new(self.field.render(
            self.field.template(TemplateUsage::NotUnderstood),
            data,
            &[("input", input)],
        )))
    }

    pub fn help(
        &self,
        data: &FormData,
        state: &FormState,
        command_help: &str,
    ) -> Result<FormPrompt, StepError> {
        let clarify = state
            .field_state()
            .filter(|field_state| field_state.is_clarifying())
            .and_then(|field_state| field_state.clarifications.first());
        match clarify {
            Some(clarify) => {
                let help = self.clarify_recognizer(clarify)?.help(None);
                Ok(FormPrompt::new(self.field.render(
                    self.field.template(TemplateUsage::HelpClarify),
                    data,
                    &[("help", help.as_str()), ("commands", command_help)],
                )))
            }
            None => Ok(help(&self.field, TemplateUsage::Help, data, command_help)),
        }
    }

    /// Going back while clarifying keeps what is settled and restarts the step.
    pub fn back(&self, data: &mut FormData, state: &mut FormState) -> bool {
        let Some(field_state) = state.field_state().filter(|s| s.is_clarifying()) else {
            return false;
        };
        let values: Vec<FieldValue> = field_state
            .settled
            .iter()
            .filter_map(MatchValue::field_value)
            .cloned()
            .collect();
        if self.field.allows_multiple() {
            if !values.is_empty() {
                self.field.set_value(data, FieldValue::List(values));
            }
        } else if let Some(value) = values.into_iter().next() {
            self.field.set_value(data, value);
        }
        state.set_current_phase(StepPhase::Ready);
        state.step_state = None;
        true
    }

    /// Turns a matched value into what the field stores.
    fn response(&self, value: MatchValue) -> Option<FieldValue> {
        let value = value.into_field_value()?;
        match value {
            FieldValue::List(_) => Some(value),
            value if self.field.allows_multiple() => Some(FieldValue::List(vec![value])),
            value => Some(value),
        }
    }

    fn settled_value(&self, settled: &[MatchValue]) -> Option<FieldValue> {
        if self.field.allows_multiple() {
            let values: Vec<FieldValue> = settled
                .iter()
                .filter_map(MatchValue::field_value)
                .cloned()
                .collect();
            (!values.is_empty()).then_some(FieldValue::List(values))
        } else {
            settled.first().cloned().and_then(MatchValue::into_field_value)
        }
    }

    /// Validates and commits `value`, completing the step when valid.
    async fn set_value(
        &self,
        data: &mut FormData,
        state: &mut FormState,
        value: Option<FieldValue>,
    ) -> Result<ValidateResult, StepError> {
        let mut result = self.field.validate(data, value.as_ref()).await?;
        if result.is_valid {
            match result.value.take().or(value) {
                Some(value) => self.field.set_value(data, value),
                None => self.field.set_unknown(data),
            }
            state.set_current_phase(StepPhase::Completed);
            debug!(step = %self.field.name(), "Field value committed");
        } else if result.feedback.is_none() {
            result.feedback = Some(String::new());
        }
        Ok(result)
    }

    /// Splits match groups into settled values and ambiguities.
    fn split_groups(&self, input: &str, matches: &[TermMatch]) -> (Vec<MatchValue>, Vec<Ambiguous>) {
        let mut groups = grouped_matches(matches);
        if !self.field.allows_multiple() {
            groups = vec![MatchGroup {
                matches: groups.into_iter().flat_map(|group| group.matches).collect(),
            }];
        }
        let mut settled = Vec::new();
        let mut ambiguous = Vec::new();
        for group in groups {
            if group.is_ambiguous() {
                let mut responses: Vec<&str> = Vec::new();
                for m in &group.matches {
                    let text = m.text(input);
                    if !responses.contains(&text) {
                        responses.push(text);
                    }
                }
                ambiguous.push(Ambiguous::new(
                    responses.join(" "),
                    distinct_values(&group.matches),
                ));
                continue;
            }
            let value = group
                .matches
                .iter()
                .find(|m| !m.is_null())
                .or_else(|| group.first())
                .map(|m| m.value.clone());
            match value {
                Some(MatchValue::Value(FieldValue::List(items))) => {
                    settled.extend(items.into_iter().map(MatchValue::Value));
                }
                Some(value) => settled.push(value),
                None => {}
            }
        }
        if settled.len() > 1 {
            settled.retain(|value| !value.is_null());
        }
        (settled, ambiguous)
    }

    fn unmatched_feedback(&self, input: &str, matches: &[TermMatch]) -> Option<String> {
        let unmatched = unmatched(input, matches).join(" ");
        let words = non_noise_words(word_break(&unmatched)).join(" ");
        match self.field.feedback() {
            FeedbackOptions::Always => Some(words),
            FeedbackOptions::Auto if !words.is_empty() => Some(words),
            _ => None,
        }
    }

    fn understood_prompt(&self, data: &FormData, words: &str) -> FormPrompt {
        let unmatched = if words.is_empty() {
            String::new()
        } else {
            self.field.render(
                self.field.template(TemplateUsage::Unmatched),
                data,
                &[("input", words)],
            )
        };
        FormPrompt::new(self.field.render(
            self.field.template(TemplateUsage::Feedback),
            data,
            &[("unmatched", unmatched.as_str())],
        ))
    }

    /// Recognizer restricted to the values of one ambiguity.
    fn clarify_recognizer(&self, clarify: &Ambiguous) -> Result<RecognizeEnumeration, StepError> {
        let recognizer = self.field.recognizer();
        let choices = clarify
            .values
            .iter()
            .map(|value| {
                let value = MatchValue::Value(value.clone());
                EnumChoice::new(
                    value.clone(),
                    recognizer.value_description(&value),
                    recognizer.valid_inputs(&value),
                )
            })
            .collect();
        let options = EnumerationOptions {
            allow_numbers: true,
            ..Default::default()
        };
        RecognizeEnumeration::new(choices, options, self.field.configuration().clone()).map_err(
            |source| {
                StepError::Build(FormBuildError::InvalidTerm {
                    field: self.field.name().to_string(),
                    source,
                })
            },
        )
    }

    fn clarify_prompt(
        &self,
        data: &FormData,
        field_state: &FieldStepState,
    ) -> Result<FormPrompt, StepError> {
        let Some(clarify) = field_state.clarifications.first() else {
            return Ok(self.field.prompt(data));
        };
        let recognizer = self.clarify_recognizer(clarify)?;
        let choices = self
            .field
            .configuration()
            .list(&recognizer.value_descriptions());
        let text = self.field.render(
            self.field.template(TemplateUsage::Clarify),
            data,
            &[("input", clarify.response.as_str()), ("choices", choices.as_str())],
        );
        Ok(FormPrompt::new(text).with_buttons(recognizer.buttons()))
    }
}

/// Distinct field values among `matches`, in order.
fn distinct_values(matches: &[TermMatch]) -> Vec<FieldValue> {
    let mut values: Vec<FieldValue> = Vec::new();
    for value in matches.iter().filter_map(|m| m.value.field_value()) {
        if !values.contains(value) {
            values.push(value.clone());
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::field::{Choice, FieldBuilder};
    use crate::domain::form::{FormConfiguration, ValidateFn};
    use crate::domain::recognition::language::generate_terms;
    use crate::domain::recognition::coalesce;
    use std::sync::Arc;

    fn config() -> Arc<FormConfiguration> {
        Arc::new(FormConfiguration::default())
    }

    fn step(builder: FieldBuilder) -> FieldStep {
        FieldStep::new(builder.build(config()).unwrap())
    }

    fn chicken() -> FieldStep {
        step(FieldBuilder::enumeration("Meat").choices([
            Choice::new("BBQChicken", "BBQ Chicken"),
            Choice::new("GrilledChicken", "Grilled Chicken"),
            Choice::new("Beef", "Beef"),
        ]))
    }

    fn toppings() -> FieldStep {
        step(
            FieldBuilder::enumeration("Toppings")
                .multiple()
                .choices(["Ham", "Olives", "Onions", "GreenPeppers"].map(Choice::named))
                .choice(Choice::new("RedOnions", "Red Onions")),
        )
    }

    /// Starts the step and feeds one reply through match and process.
    async fn reply(
        step: &FieldStep,
        data: &mut FormData,
        state: &mut FormState,
        input: &str,
    ) -> StepResult {
        let matches = coalesce(step.match_input(data, state, input).unwrap(), input);
        step.process(data, state, input, &matches).await.unwrap()
    }

    fn started(step: &FieldStep, data: &FormData) -> FormState {
        let mut state = FormState::new(1);
        step.start(data, &mut state);
        state
    }

    mod prompted {
        use super::*;

        #[tokio::test]
        async fn single_match_commits_and_completes() {
            let step = step(FieldBuilder::enumeration("Size").choices(["Large", "Small"].map(Choice::named)));
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            let result = reply(&step, &mut data, &mut state, "large").await;
            assert!(result.success);
            assert_eq!(result.next, NextStep::Next);
            assert_eq!(data.get("Size"), Some(&FieldValue::from("Large")));
            assert_eq!(state.current_phase(), StepPhase::Completed);
            assert!(state.step_state.is_none());
        }

        #[tokio::test]
        async fn multiple_field_wraps_single_value_in_list() {
            let step = toppings();
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            reply(&step, &mut data, &mut state, "ham").await;
            assert_eq!(
                data.get("Toppings"),
                Some(&FieldValue::List(vec![FieldValue::from("Ham")]))
            );
        }

        #[tokio::test]
        async fn several_unambiguous_values_are_all_kept() {
            let step = toppings();
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            reply(&step, &mut data, &mut state, "ham and olives").await;
            assert_eq!(
                data.get("Toppings"),
                Some(&FieldValue::List(vec!["Ham".into(), "Olives".into()]))
            );
        }

        #[tokio::test]
        async fn unmatched_words_produce_feedback() {
            let step = toppings();
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            let result = reply(&step, &mut data, &mut state, "ham and pineapple").await;
            let feedback = result.feedback.unwrap();
            assert_eq!(
                feedback.text,
                "For toppings I understood Ham. \"pineapple\" is not an option."
            );
        }

        #[tokio::test]
        async fn feedback_never_suppresses_unmatched_words() {
            let step = step(
                FieldBuilder::enumeration("Toppings")
                    .multiple()
                    .feedback(FeedbackOptions::Never)
                    .choices(["Ham", "Olives"].map(Choice::named)),
            );
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            let result = reply(&step, &mut data, &mut state, "ham and pineapple").await;
            assert!(result.feedback.is_none());
        }
    }

    mod clarifying {
        use super::*;

        #[tokio::test]
        async fn shared_term_starts_clarification() {
            let step = chicken();
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            let result = reply(&step, &mut data, &mut state, "chicken").await;
            let prompt = result.prompt.unwrap();
            assert_eq!(
                prompt.text,
                "By \"chicken\" meat did you mean BBQ Chicken or Grilled Chicken?"
            );
            assert_eq!(prompt.buttons.len(), 2);
            assert_eq!(state.current_phase(), StepPhase::Responding);
            assert!(state.field_state().unwrap().is_clarifying());
            assert!(data.is_unknown("Meat"));
        }

        #[tokio::test]
        async fn clarification_reply_commits_value() {
            let step = chicken();
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            reply(&step, &mut data, &mut state, "chicken").await;
            let result = reply(&step, &mut data, &mut state, "grilled").await;
            assert!(result.success);
            assert_eq!(data.get("Meat"), Some(&FieldValue::from("GrilledChicken")));
            assert_eq!(state.current_phase(), StepPhase::Completed);
        }

        #[tokio::test]
        async fn clarification_accepts_ordinal() {
            let step = chicken();
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            reply(&step, &mut data, &mut state, "chicken").await;
            reply(&step, &mut data, &mut state, "1").await;
            assert_eq!(data.get("Meat"), Some(&FieldValue::from("BBQChicken")));
        }

        #[tokio::test]
        async fn settled_values_survive_clarification() {
            let step = toppings();
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            let result = reply(&step, &mut data, &mut state, "ham and onions").await;
            assert!(result.prompt.is_some());
            let field_state = state.field_state().unwrap();
            assert_eq!(field_state.settled, vec![MatchValue::Value("Ham".into())]);
            assert_eq!(field_state.clarifications[0].response, "onions");

            reply(&step, &mut data, &mut state, "red").await;
            assert_eq!(
                data.get("Toppings"),
                Some(&FieldValue::List(vec!["Ham".into(), "RedOnions".into()]))
            );
        }

        #[tokio::test]
        async fn back_while_clarifying_commits_settled_values() {
            let step = toppings();
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            reply(&step, &mut data, &mut state, "ham and onions").await;
            assert!(step.back(&mut data, &mut state));
            assert_eq!(state.current_phase(), StepPhase::Ready);
            assert_eq!(
                data.get("Toppings"),
                Some(&FieldValue::List(vec![FieldValue::from("Ham")]))
            );
        }

        #[tokio::test]
        async fn validator_choices_start_clarification() {
            let step = step(FieldBuilder::text("City").validate_with(Arc::new(ValidateFn(
                |_: &FormData, value: Option<&FieldValue>| match value.and_then(FieldValue::as_text) {
                    Some("Springfield") => ValidateResult::ambiguous(vec![
                        "Springfield, IL".into(),
                        "Springfield, MA".into(),
                    ]),
                    _ => ValidateResult::valid(),
                },
            ))));
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            let result = reply(&step, &mut data, &mut state, "Springfield").await;
            assert!(result.prompt.unwrap().text.contains("Springfield, IL or Springfield, MA"));
            reply(&step, &mut data, &mut state, "2").await;
            assert_eq!(data.get("City"), Some(&FieldValue::from("Springfield, MA")));
        }
    }

    mod validation {
        use super::*;

        #[tokio::test]
        async fn invalid_value_keeps_step_responding() {
            let step = step(FieldBuilder::integer("Count").validate_with(Arc::new(ValidateFn(
                |_: &FormData, value: Option<&FieldValue>| match value {
                    Some(FieldValue::Integer(n)) if *n > 0 => ValidateResult::valid(),
                    _ => ValidateResult::invalid("Must be positive"),
                },
            ))));
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            let result = reply(&step, &mut data, &mut state, "0").await;
            assert!(!result.success);
            assert_eq!(result.feedback.unwrap().text, "Must be positive");
            assert_eq!(state.current_phase(), StepPhase::Responding);
            assert!(data.is_unknown("Count"));
        }

        #[tokio::test]
        async fn corrected_value_is_stored() {
            let step = step(FieldBuilder::text("Name").validate_with(Arc::new(ValidateFn(
                |_: &FormData, value: Option<&FieldValue>| {
                    let text = value.and_then(FieldValue::as_text).unwrap_or_default();
                    ValidateResult::corrected(FieldValue::from(text.to_uppercase()))
                },
            ))));
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            reply(&step, &mut data, &mut state, "john").await;
            assert_eq!(data.get("Name"), Some(&FieldValue::from("JOHN")));
        }

        #[tokio::test]
        async fn failed_validation_after_clarify_reinstates_ambiguity() {
            let step = step(
                FieldBuilder::enumeration("Meat")
                    .choices([
                        Choice::new("BBQChicken", "BBQ Chicken"),
                        Choice::new("GrilledChicken", "Grilled Chicken"),
                    ])
                    .validate_with(Arc::new(ValidateFn(|_: &FormData, value: Option<&FieldValue>| {
                        match value.and_then(FieldValue::as_text) {
                            Some("BBQChicken") => ValidateResult::invalid("Out of BBQ"),
                            _ => ValidateResult::valid(),
                        }
                    }))),
            );
            let mut data = FormData::new();
            let mut state = started(&step, &data);
            reply(&step, &mut data, &mut state, "chicken").await;
            let result = reply(&step, &mut data, &mut state, "bbq").await;
            assert_eq!(result.feedback.unwrap().text, "Out of BBQ");
            let field_state = state.field_state().unwrap();
            assert!(field_state.is_clarifying());
            assert_eq!(field_state.clarifications.len(), 1);
            assert!(field_state.settled.is_empty());
        }
    }

    mod texts {
        use super::*;

        #[test]
        fn not_understood_quotes_input() {
            let step = chicken();
            let data = FormData::new();
            let state = started(&step, &data);
            let prompt = step.not_understood(&data, &state, "pizza").unwrap();
            assert_eq!(prompt.text, "\"pizza\" is not a meat option.");
        }

        #[test]
        fn help_includes_commands() {
            let step = step(
                FieldBuilder::enumeration("Size")
                    .choices(["Large", "Small"].map(Choice::named))
                    .terms(generate_terms("Size", 3)),
            );
            let data = FormData::new();
            let state = started(&step, &data);
            let prompt = step.help(&data, &state, "Quit: stop").unwrap();
            assert!(prompt.text.starts_with("You are filling in the size field."));
            assert!(prompt.text.contains("a number 1-2"));
            assert!(prompt.text.ends_with("Quit: stop"));
        }
    }
}
