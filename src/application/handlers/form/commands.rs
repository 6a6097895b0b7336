//! Built-in commands issued in place of an answer.

use tracing::debug;

use super::errors::FormFault;
use crate::domain::form::{render, Form, FormCommand, FormPrompt, FormState, NextStep, TemplateUsage};
use crate::domain::foundation::FormData;
use crate::domain::recognition::MatchValue;
use crate::domain::step::Step;

/// What a command asks the dialog to do.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum CommandOutcome {
    /// Move the form.
    Navigate(NextStep),
    /// Answered in place; the last prompt is sent again afterwards.
    Reply(FormPrompt),
}

fn active_fields<'a>(steps: &'a [Step], data: &'a FormData) -> impl Iterator<Item = &'a Step> + 'a {
    steps
        .iter()
        .filter(move |step| matches!(step, Step::Field(_)) && step.is_active(data))
}

/// Help lines for every command, plus a navigation hint when there is more
/// than one field to switch between. Field names are not commands while
/// field inputs are being consumed, so the hint is left out then.
pub(super) fn command_help(
    form: &Form,
    steps: &[Step],
    data: &FormData,
    process_inputs: bool,
) -> String {
    let configuration = form.configuration();
    let mut lines: Vec<String> = configuration
        .all_commands()
        .into_iter()
        .map(|(_, command)| command.help)
        .collect();
    let fields: Vec<&str> = active_fields(steps, data)
        .filter_map(Step::field)
        .map(|field| field.description())
        .collect();
    if !process_inputs && fields.len() > 1 {
        let fields = configuration.list(&fields);
        lines.push(render(
            configuration.template(TemplateUsage::NavigationCommandHelp),
            &[("fields", fields.as_str())],
        ));
    }
    lines.join("\n")
}

/// One status line per active field.
pub(super) fn status(form: &Form, steps: &[Step], data: &FormData) -> FormPrompt {
    let configuration = form.configuration();
    let lines: Vec<String> = active_fields(steps, data)
        .filter_map(Step::field)
        .map(|field| {
            let value = field.describe_current(data);
            render(
                configuration.template(TemplateUsage::StatusFormat),
                &[("field", field.description()), ("value", value.as_str())],
            )
        })
        .collect();
    FormPrompt::new(lines.join("\n"))
}

pub(super) fn do_command(
    form: &Form,
    steps: &[Step],
    step: &Step,
    data: &mut FormData,
    state: &mut FormState,
    command: &MatchValue,
) -> Result<CommandOutcome, FormFault> {
    debug!(step = %step.name(), command = ?command, "Running command");
    let outcome = match command {
        MatchValue::Command(FormCommand::Backup) => {
            if step.back(data, state) {
                CommandOutcome::Navigate(NextStep::Next)
            } else {
                CommandOutcome::Navigate(NextStep::Previous)
            }
        }
        MatchValue::Command(FormCommand::Help) => {
            let help = command_help(form, steps, data, state.process_inputs);
            CommandOutcome::Reply(step.help(data, state, &help)?)
        }
        MatchValue::Command(FormCommand::Quit) => CommandOutcome::Navigate(NextStep::Quit),
        MatchValue::Command(FormCommand::Reset) => CommandOutcome::Navigate(NextStep::Reset),
        MatchValue::Command(FormCommand::Status) => CommandOutcome::Reply(status(form, steps, data)),
        MatchValue::Step(name) => CommandOutcome::Navigate(NextStep::named(name.clone())),
        other => {
            return Err(FormFault::StateMismatch(format!(
                "{:?} is not a command",
                other
            )))
        }
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::{Choice, FieldBuilder};
    use crate::domain::foundation::FieldValue;

    fn form() -> Form {
        Form::builder()
            .field(FieldBuilder::enumeration("Size").choices(["Large", "Small"].map(Choice::named)))
            .field(FieldBuilder::text("Name"))
            .build()
            .unwrap()
    }

    fn run(form: &Form, data: &mut FormData, state: &mut FormState, command: MatchValue) -> CommandOutcome {
        let step = form.steps()[state.step].clone();
        do_command(form, form.steps(), &step, data, state, &command).unwrap()
    }

    #[test]
    fn command_help_lists_commands_and_fields() {
        let form = form();
        let help = command_help(&form, form.steps(), &FormData::new(), false);
        assert!(help.contains("Back: Go back to the previous question."));
        assert!(help.contains("Quit: Quit the form without completing it."));
        assert!(help.contains("You can switch to another field by entering its name. (Size or Name)."));
    }

    #[test]
    fn single_field_has_no_navigation_hint() {
        let form = Form::builder().field(FieldBuilder::text("Name")).build().unwrap();
        let help = command_help(&form, form.steps(), &FormData::new(), false);
        assert!(!help.contains("switch to another field"));
    }

    #[test]
    fn no_navigation_hint_while_consuming_field_inputs() {
        let form = form();
        let help = command_help(&form, form.steps(), &FormData::new(), true);
        assert!(help.contains("Back: Go back to the previous question."));
        assert!(!help.contains("switch to another field"));
    }

    #[test]
    fn help_reply_follows_field_input_processing() {
        let form = form();
        let mut state = FormState::new(2);
        state.process_inputs = true;
        let outcome = run(&form, &mut FormData::new(), &mut state, MatchValue::Command(FormCommand::Help));
        let CommandOutcome::Reply(prompt) = outcome else {
            panic!("expected a reply");
        };
        assert!(!prompt.text.contains("switch to another field"));
    }

    #[test]
    fn status_describes_every_active_field() {
        let form = form();
        let data = FormData::new().with("Size", "Large");
        let prompt = status(&form, form.steps(), &data);
        assert_eq!(prompt.text, "Size: Large\nName: Unspecified");
    }

    #[test]
    fn backup_goes_to_previous_step() {
        let form = form();
        let mut state = FormState::new(2);
        state.step = 1;
        let outcome = run(&form, &mut FormData::new(), &mut state, MatchValue::Command(FormCommand::Backup));
        assert_eq!(outcome, CommandOutcome::Navigate(NextStep::Previous));
    }

    #[test]
    fn navigation_commands_map_to_directives() {
        let form = form();
        let mut state = FormState::new(2);
        let mut data = FormData::new();
        assert_eq!(
            run(&form, &mut data, &mut state, MatchValue::Command(FormCommand::Quit)),
            CommandOutcome::Navigate(NextStep::Quit)
        );
        assert_eq!(
            run(&form, &mut data, &mut state, MatchValue::Command(FormCommand::Reset)),
            CommandOutcome::Navigate(NextStep::Reset)
        );
        assert_eq!(
            run(&form, &mut data, &mut state, MatchValue::Step("Name".into())),
            CommandOutcome::Navigate(NextStep::named("Name"))
        );
    }

    #[test]
    fn help_is_a_reply() {
        let form = form();
        let mut state = FormState::new(2);
        let outcome = run(&form, &mut FormData::new(), &mut state, MatchValue::Command(FormCommand::Help));
        let CommandOutcome::Reply(prompt) = outcome else {
            panic!("expected a reply");
        };
        assert!(prompt.text.starts_with("You are filling in the size field."));
    }

    #[test]
    fn values_are_not_commands() {
        let form = form();
        let mut state = FormState::new(2);
        let step = form.steps()[0].clone();
        let result = do_command(
            &form,
            form.steps(),
            &step,
            &mut FormData::new(),
            &mut state,
            &MatchValue::Value(FieldValue::from("Large")),
        );
        assert!(matches!(result, Err(FormFault::StateMismatch(_))));
    }
}
