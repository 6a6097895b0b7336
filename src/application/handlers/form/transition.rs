//! Step selection: where a form goes after each directive.

use tracing::debug;

use super::errors::FormFault;
use crate::domain::form::{FormOptions, FormState, NextStep, StepPhase};
use crate::domain::foundation::FormData;
use crate::domain::step::Step;

fn index_of(steps: &[Step], name: &str) -> Option<usize> {
    steps.iter().position(|step| step.name() == name)
}

fn is_open(phase: StepPhase) -> bool {
    matches!(phase, StepPhase::Ready | StepPhase::Responding)
}

fn has_value(step: &Step, data: &FormData) -> bool {
    step.field().map_or(false, |field| !field.is_unknown(data))
}

/// Keeps the names that are active, or unknown so that moving to them fails.
pub fn active_steps(steps: &[Step], data: &FormData, names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter(|name| index_of(steps, name).map_or(true, |index| steps[index].is_active(data)))
        .cloned()
        .collect()
}

/// Applies `next` to `state`, returning whether there is a step to run.
///
/// `next` may be rewritten: to `Complete` when nothing is left, to `Quit`
/// when going back runs out of history, or to `Next` when a named target
/// is inactive.
pub fn advance(
    steps: &[Step],
    data: &FormData,
    state: &mut FormState,
    next: &mut NextStep,
    options: FormOptions,
) -> Result<bool, FormFault> {
    if let NextStep::Named(names) = next {
        let names = active_steps(steps, data, names);
        *next = if names.is_empty() {
            NextStep::Next
        } else {
            NextStep::Named(names)
        };
    }
    if !next.is_choice() {
        state.next = None;
    }

    match next.clone() {
        NextStep::Complete | NextStep::Quit => Ok(false),
        NextStep::Reset => {
            state.reset();
            Ok(true)
        }
        NextStep::Named(names) if names.len() > 1 => {
            if let Some(unknown) = names.iter().find(|name| index_of(steps, name).is_none()) {
                return Err(FormFault::StepOutOfRange(unknown.clone()));
            }
            Ok(true)
        }
        NextStep::Named(names) => {
            let name = names.into_iter().next().unwrap_or_default();
            let index = index_of(steps, &name).ok_or(FormFault::StepOutOfRange(name))?;
            move_to(steps, data, state, index);
            Ok(true)
        }
        NextStep::Previous => {
            let found = previous(steps, data, state);
            if !found {
                *next = NextStep::Quit;
            }
            Ok(found)
        }
        NextStep::Next => {
            let found = forward(steps, data, state, options);
            if !found {
                *next = NextStep::Complete;
            }
            Ok(found)
        }
    }
}

fn move_to(steps: &[Step], data: &FormData, state: &mut FormState, index: usize) {
    let current = state.step;
    if let Some(step) = steps.get(current) {
        let phase = if has_value(step, data) {
            StepPhase::Completed
        } else {
            StepPhase::Ready
        };
        state.set_phase(current, phase);
    }
    state.history.push(current);
    state.step = index;
    state.set_phase(index, StepPhase::Ready);
    state.step_state = None;
    debug!(step = %steps[index].name(), "Moved to named step");
}

fn previous(steps: &[Step], data: &FormData, state: &mut FormState) -> bool {
    while let Some(index) = state.history.pop() {
        if !steps.get(index).map_or(false, |step| step.is_active(data)) {
            continue;
        }
        let current = state.step;
        if let Some(step) = steps.get(current) {
            let phase = if has_value(step, data) {
                StepPhase::Completed
            } else {
                StepPhase::Ready
            };
            state.set_phase(current, phase);
        }
        state.step = index;
        state.set_phase(index, StepPhase::Ready);
        state.step_state = None;
        return true;
    }
    false
}

/// First open, active step scanning forward from the current one.
fn scan(steps: &[Step], data: &FormData, state: &FormState) -> Option<usize> {
    let count = steps.len();
    let start = state.step.min(count.checked_sub(1)?);
    let found = (0..count)
        .map(|offset| (start + offset) % count)
        .find(|&index| is_open(state.phase(index)) && steps[index].is_active(data))?;
    let dependency = steps[found]
        .dependencies()
        .iter()
        .filter_map(|name| index_of(steps, name))
        .find(|&index| steps[index].is_active(data) && state.phase(index) != StepPhase::Completed);
    Some(dependency.unwrap_or(found))
}

fn is_leading_message(steps: &[Step], index: usize) -> bool {
    steps[..=index]
        .iter()
        .all(|step| matches!(step, Step::Message(_)))
}

/// Step of the last queued field input that can still be used.
fn queued_input_step(steps: &[Step], data: &FormData, state: &mut FormState) -> Option<usize> {
    loop {
        let index = state.field_inputs.as_ref()?.last()?.step;
        if steps.get(index).map_or(false, |step| step.is_active(data)) && is_open(state.phase(index)) {
            return Some(index);
        }
        if let Some(inputs) = state.field_inputs.as_mut() {
            inputs.pop();
        }
    }
}

fn finish_inputs(steps: &[Step], state: &mut FormState, options: FormOptions) {
    debug!("Field inputs consumed");
    if options.prompt_fields_with_values {
        state.reset();
    } else {
        state.field_inputs = None;
        state.process_inputs = false;
        state.step = 0;
        state.step_state = None;
    }
    for (index, step) in steps.iter().enumerate() {
        if !matches!(step, Step::Message(_)) {
            break;
        }
        state.set_phase(index, StepPhase::Completed);
    }
}

fn forward(steps: &[Step], data: &FormData, state: &mut FormState, options: FormOptions) -> bool {
    for (index, step) in steps.iter().enumerate() {
        if let Step::Field(field_step) = step {
            let field = field_step.field();
            if state.phase(index) == StepPhase::Completed
                && !field.is_optional()
                && field.is_unknown(data)
                && step.is_active(data)
            {
                state.set_phase(index, StepPhase::Ready);
            }
        }
    }

    let Some(chosen) = scan(steps, data, state) else {
        return false;
    };

    if state.process_inputs
        && !(is_leading_message(steps, chosen) && state.phase(chosen) == StepPhase::Ready)
    {
        match queued_input_step(steps, data, state) {
            Some(index) => {
                if index != state.step {
                    state.step_state = None;
                }
                state.step = index;
                return true;
            }
            None => {
                finish_inputs(steps, state, options);
                return forward(steps, data, state, options);
            }
        }
    }

    if chosen != state.step {
        if !matches!(steps.get(state.step), Some(Step::Message(_))) {
            state.history.push(state.step);
        }
        state.step_state = None;
    }
    state.step = chosen;
    true
}

/// Marks ready field steps that already hold a usable value as completed.
pub async fn skip_steps(
    steps: &[Step],
    data: &FormData,
    state: &mut FormState,
    options: FormOptions,
) -> Result<(), FormFault> {
    if options.prompt_fields_with_values {
        return Ok(());
    }
    for (index, step) in steps.iter().enumerate() {
        let Step::Field(field_step) = step else {
            continue;
        };
        let field = field_step.field();
        if state.phase(index) != StepPhase::Ready || !field.is_nullable() {
            continue;
        }
        let Some(value) = field.value(data) else {
            continue;
        };
        if field.within_limits(value) && field.validate(data, Some(value)).await?.is_valid {
            debug!(step = %field.name(), "Skipping step with known value");
            state.set_phase(index, StepPhase::Completed);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::state::FieldInput;
    use crate::domain::form::{Choice, FieldBuilder, Form, ValidateFn, ValidateResult};
    use crate::domain::foundation::FieldValue;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn pizza() -> Form {
        Form::builder()
            .message("Welcome!")
            .field(FieldBuilder::enumeration("Size").choices(["Large", "Small"].map(Choice::named)))
            .field(FieldBuilder::text("Name"))
            .field(
                FieldBuilder::text("Instructions")
                    .optional()
                    .active_when(|data| data.get("Size") == Some(&FieldValue::from("Large"))),
            )
            .build()
            .unwrap()
    }

    fn step(form: &Form, state: &mut FormState, data: &FormData, mut next: NextStep) -> (bool, NextStep) {
        let found = advance(form.steps(), data, state, &mut next, FormOptions::default()).unwrap();
        (found, next)
    }

    mod forward {
        use super::*;

        #[test]
        fn first_step_is_leading_message() {
            let form = pizza();
            let mut state = FormState::new(4);
            let (found, _) = step(&form, &mut state, &FormData::new(), NextStep::Next);
            assert!(found);
            assert_eq!(state.step, 0);
        }

        #[test]
        fn moves_past_completed_steps_and_records_history() {
            let form = pizza();
            let mut state = FormState::new(4);
            state.set_phase(0, StepPhase::Completed);
            state.step = 1;
            state.set_phase(1, StepPhase::Completed);
            let data = FormData::new().with("Size", "Small");
            step(&form, &mut state, &data, NextStep::Next);
            assert_eq!(state.step, 2);
            assert_eq!(state.history, vec![1]);
        }

        #[test]
        fn message_steps_are_not_recorded_in_history() {
            let form = pizza();
            let mut state = FormState::new(4);
            state.set_phase(0, StepPhase::Completed);
            step(&form, &mut state, &FormData::new(), NextStep::Next);
            assert_eq!(state.step, 1);
            assert!(state.history.is_empty());
        }

        #[test]
        fn inactive_steps_are_skipped_and_form_completes() {
            let form = pizza();
            let mut state = FormState::new(4);
            for index in 0..3 {
                state.set_phase(index, StepPhase::Completed);
            }
            state.step = 2;
            let data = FormData::new().with("Size", "Small").with("Name", "Ann");
            let (found, next) = step(&form, &mut state, &data, NextStep::Next);
            assert!(!found);
            assert_eq!(next, NextStep::Complete);
        }

        #[test]
        fn scan_wraps_around() {
            let form = pizza();
            let mut state = FormState::new(4);
            state.set_phase(0, StepPhase::Completed);
            state.set_phase(2, StepPhase::Completed);
            state.step = 2;
            let data = FormData::new().with("Name", "Ann");
            step(&form, &mut state, &data, NextStep::Next);
            assert_eq!(state.step, 1);
        }

        #[test]
        fn completed_required_field_without_value_is_reopened() {
            let form = pizza();
            let mut state = FormState::new(4);
            state.phases = vec![StepPhase::Completed; 4];
            state.step = 3;
            let data = FormData::new().with("Size", "Small");
            let (found, _) = step(&form, &mut state, &data, NextStep::Next);
            assert!(found);
            assert_eq!(state.step, 2);
        }

        #[test]
        fn open_dependency_is_visited_first() {
            let form = Form::builder()
                .field(FieldBuilder::text("Name"))
                .field(FieldBuilder::text("Greeting").depends_on("Name"))
                .build()
                .unwrap();
            let mut state = FormState::new(2);
            state.step = 1;
            step(&form, &mut state, &FormData::new(), NextStep::Next);
            assert_eq!(state.step, 0);
        }
    }

    mod named {
        use super::*;

        #[test]
        fn moves_to_named_step() {
            let form = pizza();
            let mut state = FormState::new(4);
            state.step = 2;
            state.set_phase(1, StepPhase::Completed);
            state.set_phase(2, StepPhase::Responding);
            let data = FormData::new().with("Size", "Large");
            let (found, _) = step(&form, &mut state, &data, NextStep::named("Size"));
            assert!(found);
            assert_eq!(state.step, 1);
            assert_eq!(state.phase(1), StepPhase::Ready);
            assert_eq!(state.phase(2), StepPhase::Ready);
            assert_eq!(state.history, vec![2]);
        }

        #[test]
        fn unknown_name_is_a_fault() {
            let form = pizza();
            let mut state = FormState::new(4);
            let mut next = NextStep::named("Crust");
            let result = advance(form.steps(), &FormData::new(), &mut state, &mut next, FormOptions::default());
            assert!(matches!(result, Err(FormFault::StepOutOfRange(name)) if name == "Crust"));
        }

        #[test]
        fn inactive_name_falls_back_to_next() {
            let form = pizza();
            let mut state = FormState::new(4);
            let (found, next) = step(&form, &mut state, &FormData::new(), NextStep::named("Instructions"));
            assert!(found);
            assert_eq!(next, NextStep::Next);
            assert_eq!(state.step, 0);
        }

        #[test]
        fn several_names_stay_put() {
            let form = pizza();
            let mut state = FormState::new(4);
            state.step = 2;
            let names = NextStep::Named(vec!["Size".into(), "Name".into()]);
            let (found, next) = step(&form, &mut state, &FormData::new(), names.clone());
            assert!(found);
            assert_eq!(next, names);
            assert_eq!(state.step, 2);
        }
    }

    mod backward {
        use super::*;

        #[test]
        fn previous_pops_history() {
            let form = pizza();
            let mut state = FormState::new(4);
            state.step = 2;
            state.history = vec![1];
            state.set_phase(1, StepPhase::Completed);
            state.set_phase(2, StepPhase::Responding);
            let data = FormData::new().with("Size", "Small");
            let (found, _) = step(&form, &mut state, &data, NextStep::Previous);
            assert!(found);
            assert_eq!(state.step, 1);
            assert_eq!(state.phase(1), StepPhase::Ready);
            assert_eq!(state.phase(2), StepPhase::Ready);
            assert!(state.history.is_empty());
        }

        #[test]
        fn exhausted_history_quits() {
            let form = pizza();
            let mut state = FormState::new(4);
            state.step = 1;
            let (found, next) = step(&form, &mut state, &FormData::new(), NextStep::Previous);
            assert!(!found);
            assert_eq!(next, NextStep::Quit);
        }
    }

    mod field_inputs {
        use super::*;

        fn queued(state: &mut FormState, inputs: &[(usize, &str)]) {
            state.field_inputs = Some(
                inputs
                    .iter()
                    .map(|(step, text)| FieldInput {
                        step: *step,
                        text: text.to_string(),
                    })
                    .collect(),
            );
            state.process_inputs = true;
        }

        #[test]
        fn leading_message_runs_before_inputs() {
            let form = pizza();
            let mut state = FormState::new(4);
            queued(&mut state, &[(2, "Ann"), (1, "large")]);
            step(&form, &mut state, &FormData::new(), NextStep::Next);
            assert_eq!(state.step, 0);
        }

        #[test]
        fn last_queued_input_wins() {
            let form = pizza();
            let mut state = FormState::new(4);
            state.set_phase(0, StepPhase::Completed);
            queued(&mut state, &[(2, "Ann"), (1, "large")]);
            step(&form, &mut state, &FormData::new(), NextStep::Next);
            assert_eq!(state.step, 1);
        }

        #[test]
        fn drained_queue_restarts_at_first_step() {
            let form = pizza();
            let mut state = FormState::new(4);
            state.set_phase(0, StepPhase::Completed);
            state.set_phase(1, StepPhase::Completed);
            state.step = 1;
            queued(&mut state, &[(1, "large")]);
            let data = FormData::new().with("Size", "Large");
            step(&form, &mut state, &data, NextStep::Next);
            assert!(!state.process_inputs);
            assert!(state.field_inputs.is_none());
            assert_eq!(state.step, 2);
        }
    }

    mod skipping {
        use super::*;

        #[tokio::test]
        async fn known_values_are_completed() {
            let form = pizza();
            let mut state = FormState::new(4);
            let data = FormData::new().with("Name", "Ann");
            skip_steps(form.steps(), &data, &mut state, FormOptions::default())
                .await
                .unwrap();
            assert_eq!(state.phase(2), StepPhase::Completed);
            assert_eq!(state.phase(1), StepPhase::Ready);
        }

        #[tokio::test]
        async fn nothing_is_skipped_when_prompting_fields_with_values() {
            let form = pizza();
            let mut state = FormState::new(4);
            let data = FormData::new().with("Name", "Ann");
            let options = FormOptions {
                prompt_fields_with_values: true,
                ..Default::default()
            };
            skip_steps(form.steps(), &data, &mut state, options).await.unwrap();
            assert_eq!(state.phase(2), StepPhase::Ready);
        }

        #[tokio::test]
        async fn invalid_values_are_not_skipped() {
            let form = Form::builder()
                .field(FieldBuilder::text("Name").validate_with(Arc::new(ValidateFn(
                    |_: &FormData, _: Option<&FieldValue>| ValidateResult::invalid("no"),
                ))))
                .build()
                .unwrap();
            let mut state = FormState::new(1);
            let data = FormData::new().with("Name", "Ann");
            skip_steps(form.steps(), &data, &mut state, FormOptions::default())
                .await
                .unwrap();
            assert_eq!(state.phase(0), StepPhase::Ready);
        }
    }

    fn phase() -> impl Strategy<Value = StepPhase> {
        prop_oneof![
            Just(StepPhase::Ready),
            Just(StepPhase::Responding),
            Just(StepPhase::Completed),
        ]
    }

    proptest! {
        #[test]
        fn reset_always_returns_to_a_fresh_start(
            phases in proptest::collection::vec(phase(), 4),
            current in 0usize..4,
            history in proptest::collection::vec(0usize..4, 0..6),
        ) {
            let form = pizza();
            let mut state = FormState::new(4);
            state.phases = phases;
            state.step = current;
            state.history = history;
            let (found, _) = step(&form, &mut state, &FormData::new(), NextStep::Reset);
            prop_assert!(found);
            prop_assert_eq!(state.step, 0);
            prop_assert!(state.history.is_empty());
            prop_assert!(state.phases.iter().all(|p| *p == StepPhase::Ready));
        }

        #[test]
        fn next_keeps_state_consistent(
            phases in proptest::collection::vec(phase(), 4),
            current in 0usize..4,
        ) {
            let form = pizza();
            let mut state = FormState::new(4);
            state.phases = phases;
            state.step = current;
            step(&form, &mut state, &FormData::new(), NextStep::Next);
            prop_assert_eq!(state.phases.len(), 4);
            prop_assert!(state.step < 4);
            prop_assert!(state.validate_for(4).is_ok());
        }
    }
}
