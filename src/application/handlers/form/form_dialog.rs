//! FormDialog - Drives a form one inbound message at a time.
//!
//! The dialog owns no conversation state. Each call receives the host's
//! form data and form state, runs steps until it needs another message or
//! the form ends, and hands the data back.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::commands::{self, CommandOutcome};
use super::errors::{CancelReason, FormCanceled, FormFault};
use super::transition;
use crate::domain::form::state::FieldInput;
use crate::domain::form::{Field, Form, FormPrompt, FormState, NextStep, StepPhase};
use crate::domain::foundation::FormData;
use crate::domain::recognition::{
    best_matches, coalesce, highest_confidence, is_full_match, MatchValue, Recognize, TermMatch,
};
use crate::domain::step::{described_values, NavigationStep, Step};
use crate::ports::{CompletionHandler, FormPrompter, PromptChannel};

/// Confidence a match set needs to be taken without comparing alternatives.
const FULL_MATCH_THRESHOLD: f64 = 1.0;

/// A value for a step extracted from outside the conversation, such as an
/// intent recognizer's entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInput {
    /// Name of the step the text answers.
    pub step: String,
    pub text: String,
}

impl EntityInput {
    pub fn new(step: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            text: text.into(),
        }
    }
}

/// Where a form stands after a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The dialog asked something and waits for the next message.
    AwaitingInput(FormData),
    /// Every step is done; the completion handler has run.
    Completed(FormData),
}

impl TurnOutcome {
    pub fn data(&self) -> &FormData {
        match self {
            TurnOutcome::AwaitingInput(data) | TurnOutcome::Completed(data) => data,
        }
    }

    pub fn into_data(self) -> FormData {
        match self {
            TurnOutcome::AwaitingInput(data) | TurnOutcome::Completed(data) => data,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed(_))
    }
}

/// How a turn ended before the outcome is reported.
enum TurnEnd {
    Waiting,
    Complete,
    Quit,
}

/// Runs a [`Form`] against a prompt channel.
pub struct FormDialog {
    form: Arc<Form>,
    channel: Arc<dyn PromptChannel>,
    completion: Option<Arc<dyn CompletionHandler>>,
    prompter: Option<Arc<dyn FormPrompter>>,
}

impl FormDialog {
    pub fn new(form: Arc<Form>, channel: Arc<dyn PromptChannel>) -> Self {
        Self {
            form,
            channel,
            completion: None,
            prompter: None,
        }
    }

    /// Called with the data once the form completes.
    pub fn with_completion(mut self, completion: Arc<dyn CompletionHandler>) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Routes every prompt through `prompter` instead of straight to the channel.
    pub fn with_prompter(mut self, prompter: Arc<dyn FormPrompter>) -> Self {
        self.prompter = Some(prompter);
        self
    }

    pub fn form(&self) -> &Arc<Form> {
        &self.form
    }

    /// Begins the form, seeding replies from `entities`.
    ///
    /// Runs the first turn right away when the form's `prompt_in_start`
    /// option is set; otherwise the form waits for a message.
    ///
    /// # Errors
    ///
    /// Returns `FormCanceled` if a hook or the channel fails.
    pub async fn start(
        &self,
        data: FormData,
        state: &mut FormState,
        entities: &[EntityInput],
    ) -> Result<TurnOutcome, FormCanceled> {
        info!(
            steps = self.form.steps().len(),
            entities = entities.len(),
            "Starting form"
        );
        *state = FormState::new(self.form.steps().len());
        self.queue_entities(state, entities);

        let options = self.form.options();
        if let Err(fault) = transition::skip_steps(self.form.steps(), &data, state, options).await {
            return Err(self.canceled(data, state, CancelReason::Fault(fault)));
        }
        state.step = 0;
        state.step_state = None;

        if options.prompt_in_start {
            self.message_received(data, state, None).await
        } else {
            Ok(TurnOutcome::AwaitingInput(data))
        }
    }

    /// Handles one inbound message, or continues without one when `text`
    /// is `None`.
    ///
    /// # Errors
    ///
    /// Returns `FormCanceled` when the user quits or the turn faults. The
    /// error carries the data gathered so far.
    pub async fn message_received(
        &self,
        mut data: FormData,
        state: &mut FormState,
        text: Option<&str>,
    ) -> Result<TurnOutcome, FormCanceled> {
        if let Err(err) = state.validate_for(self.form.steps().len()) {
            warn!(error = %err, "Rejecting form state");
            let fault = FormFault::StateMismatch(err.to_string());
            return Err(self.canceled(data, state, CancelReason::Fault(fault)));
        }

        let mut steps = self.form.steps().to_vec();
        let ended = match self.run_turn(&mut steps, &mut data, state, text).await {
            Ok(TurnEnd::Complete) => match &self.completion {
                Some(completion) => completion
                    .on_completion(&data)
                    .await
                    .map(|_| TurnEnd::Complete)
                    .map_err(FormFault::from),
                None => Ok(TurnEnd::Complete),
            },
            other => other,
        };

        match ended {
            Ok(TurnEnd::Waiting) => Ok(TurnOutcome::AwaitingInput(data)),
            Ok(TurnEnd::Complete) => {
                info!(fields = data.len(), "Form completed");
                Ok(TurnOutcome::Completed(data))
            }
            Ok(TurnEnd::Quit) => {
                info!("Form quit");
                Err(self.canceled(data, state, CancelReason::Quit))
            }
            Err(fault) => {
                warn!(error = %fault, step = state.step, "Form turn failed");
                Err(self.canceled(data, state, CancelReason::Fault(fault)))
            }
        }
    }

    fn queue_entities(&self, state: &mut FormState, entities: &[EntityInput]) {
        let mut grouped: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for entity in entities {
            match self.form.step_index(&entity.step) {
                Some(index) if matches!(self.form.steps()[index], Step::Field(_)) => {
                    grouped.entry(index).or_default().push(entity.text.as_str());
                }
                _ => warn!(step = %entity.step, "Ignoring entity for unknown field"),
            }
        }
        if grouped.is_empty() {
            return;
        }
        // Consumed from the back, so the lowest step goes last.
        let inputs: Vec<FieldInput> = grouped
            .into_iter()
            .rev()
            .map(|(step, texts)| FieldInput {
                step,
                text: texts.join(" "),
            })
            .collect();
        debug!(inputs = inputs.len(), "Queued field inputs");
        state.field_inputs = Some(inputs);
        state.process_inputs = true;
    }

    async fn run_turn(
        &self,
        steps: &mut [Step],
        data: &mut FormData,
        state: &mut FormState,
        text: Option<&str>,
    ) -> Result<TurnEnd, FormFault> {
        let options = self.form.options();
        let configuration = self.form.configuration().clone();
        let mut input: Option<String> = text.map(|text| text.trim().to_string());
        let mut next = state.next.clone().unwrap_or_default();
        let mut wait = false;

        while !wait && transition::advance(steps, data, state, &mut next, options)? {
            if let NextStep::Named(names) = &next {
                if names.len() > 1 {
                    let navigation = Step::Navigation(NavigationStep::new(
                        names,
                        steps,
                        data,
                        configuration.clone(),
                    )?);
                    if state.next.is_none() {
                        state.next = Some(next.clone());
                        let prompt = navigation.start(data, state, &[]);
                        self.ask(state, data, prompt, navigation.field()).await?;
                        wait = true;
                    } else if let Some(text) = input.take() {
                        wait = self
                            .respond(steps, &navigation, data, state, &text, &mut next)
                            .await?;
                    } else {
                        wait = true;
                    }
                    continue;
                }
            }

            let index = state.step;
            if !steps[index].define(data).await? {
                state.set_phase(index, StepPhase::Completed);
                next = NextStep::Next;
                continue;
            }
            let steps: &[Step] = steps;
            let step = &steps[index];

            match state.phase(index) {
                StepPhase::Ready => {
                    if let Step::Message(_) = step {
                        let values = described_values(steps, data, &configuration);
                        let prompt = step.start(data, state, &values);
                        self.deliver(data, prompt, None).await?;
                        state.set_phase(index, StepPhase::Completed);
                        next = NextStep::Next;
                    } else if let Some(text) = take_queued_input(state, index) {
                        debug!(step = %step.name(), "Answering from field input");
                        let values = described_values(steps, data, &configuration);
                        step.start(data, state, &values);
                        wait = self.respond(steps, step, data, state, &text, &mut next).await?;
                    } else {
                        debug!(step = %step.name(), "Prompting");
                        let values = described_values(steps, data, &configuration);
                        let prompt = step.start(data, state, &values);
                        self.ask(state, data, prompt, step.field()).await?;
                        wait = true;
                    }
                }
                StepPhase::Responding => match input.take() {
                    Some(text) => {
                        wait = self.respond(steps, step, data, state, &text, &mut next).await?;
                    }
                    None => wait = true,
                },
                StepPhase::Completed => next = NextStep::Next,
            }
        }

        if wait {
            return Ok(TurnEnd::Waiting);
        }
        Ok(match next {
            NextStep::Complete => TurnEnd::Complete,
            NextStep::Quit => TurnEnd::Quit,
            _ => TurnEnd::Waiting,
        })
    }

    /// Interprets a reply to `step`, returning whether to wait for the next
    /// message.
    async fn respond(
        &self,
        steps: &[Step],
        step: &Step,
        data: &mut FormData,
        state: &mut FormState,
        input: &str,
        next: &mut NextStep,
    ) -> Result<bool, FormFault> {
        let step_matches = coalesce(step.match_input(data, state, input)?, input);
        let command_matches = self.command_matches(steps, data, state, input);

        let use_command = if is_full_match(input, &step_matches, FULL_MATCH_THRESHOLD) {
            false
        } else if command_matches.len() == 1
            && is_full_match(input, &command_matches, FULL_MATCH_THRESHOLD)
        {
            true
        } else if step_matches.is_empty() && command_matches.is_empty() {
            debug!(step = %step.name(), input, "Reply not understood");
            let prompt = step.not_understood(data, state, input)?;
            self.deliver(data, prompt, step.field()).await?;
            if state.process_inputs && !step.in_clarify(state) {
                state.set_current_phase(StepPhase::Ready);
                return Ok(false);
            }
            return Ok(true);
        } else {
            best_matches(&[&step_matches, &command_matches]) == Some(1)
        };

        if use_command {
            let Some(command) = highest_confidence(&command_matches).into_iter().next() else {
                return Ok(true);
            };
            return match commands::do_command(&self.form, steps, step, data, state, &command.value)? {
                CommandOutcome::Navigate(directive) => {
                    *next = directive;
                    Ok(false)
                }
                CommandOutcome::Reply(prompt) => {
                    self.deliver(data, prompt, step.field()).await?;
                    self.repeat_last(state, data, step.field()).await?;
                    Ok(true)
                }
            };
        }

        self.process(steps, step, data, state, input, &step_matches, next)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn process(
        &self,
        steps: &[Step],
        step: &Step,
        data: &mut FormData,
        state: &mut FormState,
        input: &str,
        matches: &[TermMatch],
        next: &mut NextStep,
    ) -> Result<bool, FormFault> {
        let result = step.process(data, state, input, matches).await?;
        transition::skip_steps(steps, data, state, self.form.options()).await?;
        *next = result.next;
        debug!(step = %step.name(), next = ?next, "Processed reply");

        let mut wait = false;
        if let Some(feedback) = result.feedback {
            self.deliver(data, feedback, step.field()).await?;
            if state.current_phase() != StepPhase::Completed {
                if !state.process_inputs {
                    if result.prompt.is_none() {
                        self.repeat_last(state, data, step.field()).await?;
                    }
                    wait = true;
                } else if result.prompt.as_ref().map_or(false, |p| !p.buttons.is_empty()) {
                    wait = true;
                } else {
                    state.set_current_phase(StepPhase::Ready);
                }
            }
        }
        if let Some(prompt) = result.prompt {
            self.ask(state, data, prompt, step.field()).await?;
            wait = true;
        }
        Ok(wait)
    }

    /// Command and field-name matches for `input`.
    fn command_matches(
        &self,
        steps: &[Step],
        data: &FormData,
        state: &FormState,
        input: &str,
    ) -> Vec<TermMatch> {
        if input.starts_with('"') {
            return Vec::new();
        }
        let matches = self.form.commands().matches(input, None).filter(|m| match &m.value {
            MatchValue::Step(name) => {
                !state.process_inputs
                    && steps
                        .iter()
                        .any(|step| step.name() == name && step.is_active(data))
            }
            _ => true,
        });
        coalesce(matches, input)
    }

    /// Sends a prompt without remembering it.
    async fn deliver(
        &self,
        data: &FormData,
        prompt: FormPrompt,
        field: Option<&Field>,
    ) -> Result<FormPrompt, FormFault> {
        if prompt.is_empty() {
            return Ok(prompt);
        }
        let delivered = match &self.prompter {
            Some(prompter) => {
                prompter
                    .prompt(self.channel.as_ref(), prompt, data, field)
                    .await?
            }
            None => self.channel.post_prompt(prompt).await?,
        };
        Ok(delivered)
    }

    /// Sends a question and remembers it for repeating.
    async fn ask(
        &self,
        state: &mut FormState,
        data: &FormData,
        prompt: FormPrompt,
        field: Option<&Field>,
    ) -> Result<(), FormFault> {
        let delivered = self.deliver(data, prompt, field).await?;
        if !delivered.is_empty() {
            state.last_prompt = Some(delivered);
        }
        Ok(())
    }

    async fn repeat_last(
        &self,
        state: &FormState,
        data: &FormData,
        field: Option<&Field>,
    ) -> Result<(), FormFault> {
        if let Some(prompt) = state.last_prompt.clone() {
            self.deliver(data, prompt, field).await?;
        }
        Ok(())
    }

    fn canceled(&self, data: FormData, state: &FormState, reason: CancelReason) -> FormCanceled {
        let steps = self.form.steps();
        FormCanceled {
            last_step: steps
                .get(state.step)
                .map(|step| step.name().to_string())
                .unwrap_or_default(),
            completed: steps
                .iter()
                .enumerate()
                .filter(|(index, _)| state.phase(*index) == StepPhase::Completed)
                .map(|(_, step)| step.name().to_string())
                .collect(),
            data,
            reason,
        }
    }
}

/// Pops the queued input for `index` if it is next in line.
fn take_queued_input(state: &mut FormState, index: usize) -> Option<String> {
    if !state.process_inputs {
        return None;
    }
    let inputs = state.field_inputs.as_mut()?;
    if inputs.last()?.step != index {
        return None;
    }
    inputs.pop().map(|input| input.text)
}
