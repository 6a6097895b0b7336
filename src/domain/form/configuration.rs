//! Form vocabulary: command terms, yes/no terms and prompt templates.
//!
//! Everything user-facing that the engine says or listens for is defined
//! here with English defaults. Hosts can override any part of it through
//! configuration; missing templates and commands fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::command::FormCommand;

/// Where a template is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateUsage {
    Bool,
    BoolHelp,
    Clarify,
    CurrentChoice,
    DateTime,
    DateTimeHelp,
    Double,
    DoubleHelp,
    EnumSelectOne,
    EnumSelectMany,
    EnumOneHelp,
    EnumManyHelp,
    Feedback,
    Help,
    HelpClarify,
    HelpConfirm,
    HelpNavigation,
    Integer,
    IntegerHelp,
    Navigation,
    NavigationCommandHelp,
    NavigationFormat,
    NoPreference,
    NotUnderstood,
    StatusFormat,
    String,
    StringHelp,
    Unmatched,
    Unspecified,
}

impl TemplateUsage {
    /// Built-in English pattern for this usage.
    pub fn default_template(self) -> &'static str {
        match self {
            TemplateUsage::Bool => "Would you like {field}?",
            TemplateUsage::BoolHelp => "Please enter 'yes' or 'no'{current}.",
            TemplateUsage::Clarify => "By \"{input}\" {field} did you mean {choices}?",
            TemplateUsage::CurrentChoice => "Current choice",
            TemplateUsage::DateTime => "Please enter a date and time for {field}{current}",
            TemplateUsage::DateTimeHelp => {
                "Please enter a date or time like 'today', 'tomorrow' or '2026-07-03 18:30'{current}."
            }
            TemplateUsage::Double => "Please enter a number for {field}{current}",
            TemplateUsage::DoubleHelp => "Please enter a number{limits}{current}.",
            TemplateUsage::EnumSelectOne => "Please select {field}: {choices}{current}",
            TemplateUsage::EnumSelectMany => "Please select one or more {field}: {choices}{current}",
            TemplateUsage::EnumOneHelp => "You can enter {numbers}words from the descriptions ({choices}){current}.",
            TemplateUsage::EnumManyHelp => {
                "You can enter one or more selections, {numbers}words from the descriptions ({choices}){current}."
            }
            TemplateUsage::Feedback => "For {field} I understood {value}.{unmatched}",
            TemplateUsage::Help => "You are filling in the {field} field. Possible responses:\n{help}\n{commands}",
            TemplateUsage::HelpClarify => {
                "You are clarifying a {field} value. Possible responses:\n{help}\n{commands}"
            }
            TemplateUsage::HelpConfirm => "Please answer the question. Possible responses:\n{help}\n{commands}",
            TemplateUsage::HelpNavigation => {
                "Choose what field to change. Possible responses:\n{help}\n{commands}"
            }
            TemplateUsage::Integer => "Please enter a number for {field}{current}",
            TemplateUsage::IntegerHelp => "Please enter a whole number{limits}{current}.",
            TemplateUsage::Navigation => "What do you want to change?",
            TemplateUsage::NavigationCommandHelp => {
                "You can switch to another field by entering its name. ({fields})."
            }
            TemplateUsage::NavigationFormat => "{field}({value})",
            TemplateUsage::NoPreference => "No preference",
            TemplateUsage::NotUnderstood => "\"{input}\" is not a {field} option.",
            TemplateUsage::StatusFormat => "{field}: {value}",
            TemplateUsage::String => "Please enter {field}{current}",
            TemplateUsage::StringHelp => "You can enter anything (use \"'s to force string){current}.",
            TemplateUsage::Unmatched => " \"{input}\" is not an option.",
            TemplateUsage::Unspecified => "Unspecified",
        }
    }
}

/// Terms and help for one built-in command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescription {
    /// Short label shown in command lists.
    pub description: String,
    /// Regex fragments that invoke the command.
    pub terms: Vec<String>,
    /// One line of help text.
    pub help: String,
}

impl CommandDescription {
    fn new(description: &str, terms: &[&str], help: &str) -> Self {
        Self {
            description: description.to_string(),
            terms: terms.iter().map(|term| term.to_string()).collect(),
            help: help.to_string(),
        }
    }

    /// Built-in English description for `command`.
    pub fn default_for(command: FormCommand) -> Self {
        match command {
            FormCommand::Backup => Self::new(
                "Back",
                &["backup", "go back", "back"],
                "Back: Go back to the previous question.",
            ),
            FormCommand::Help => Self::new(
                "Help",
                &[r"\?", "help", "choices"],
                "Help: Show the kinds of responses you can enter.",
            ),
            FormCommand::Quit => Self::new(
                "Quit",
                &["quit", "stop", "finish", "goodbye", "good bye"],
                "Quit: Quit the form without completing it.",
            ),
            FormCommand::Reset => Self::new(
                "Start over",
                &["start over", "reset", "clear"],
                "Reset: Start the form over.",
            ),
            FormCommand::Status => Self::new(
                "Status",
                &["status", "progress", "so far"],
                "Status: Show your progress in filling in the current form.",
            ),
        }
    }
}

/// The vocabulary a form speaks and listens with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfiguration {
    pub commands: BTreeMap<FormCommand, CommandDescription>,
    pub yes: Vec<String>,
    pub no: Vec<String>,
    pub no_preference: Vec<String>,
    pub current_choice: Vec<String>,
    /// Overrides for the built-in templates.
    pub templates: BTreeMap<TemplateUsage, String>,
    pub choice_separator: String,
    pub choice_last_separator: String,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Default for FormConfiguration {
    fn default() -> Self {
        Self {
            commands: FormCommand::ALL
                .iter()
                .map(|&command| (command, CommandDescription::default_for(command)))
                .collect(),
            yes: strings(&["yes", "y", "sure", "ok", "yep", "1"]),
            no: strings(&["no", "n", "nope", "2"]),
            no_preference: strings(&["none", "no preference", "i don'?t care"]),
            current_choice: strings(&["c", "current choice", "keep"]),
            templates: BTreeMap::new(),
            choice_separator: ", ".to_string(),
            choice_last_separator: " or ".to_string(),
        }
    }
}

impl FormConfiguration {
    pub fn template(&self, usage: TemplateUsage) -> &str {
        self.templates
            .get(&usage)
            .map(String::as_str)
            .unwrap_or_else(|| usage.default_template())
    }

    pub fn command(&self, command: FormCommand) -> CommandDescription {
        self.commands
            .get(&command)
            .cloned()
            .unwrap_or_else(|| CommandDescription::default_for(command))
    }

    /// Commands in declaration order, overrides applied.
    pub fn all_commands(&self) -> Vec<(FormCommand, CommandDescription)> {
        FormCommand::ALL
            .iter()
            .map(|&command| (command, self.command(command)))
            .collect()
    }

    /// Joins values with the configured separators.
    pub fn list<S: AsRef<str>>(&self, values: &[S]) -> String {
        crate::domain::recognition::language::build_list(
            values,
            &self.choice_separator,
            &self.choice_last_separator,
        )
    }
}

/// Behavior switches for a form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// Send the first prompt as soon as the form starts.
    pub prompt_in_start: bool,
    /// Prompt for fields even when they already hold a valid value.
    pub prompt_fields_with_values: bool,
}
