//! Built-in commands available at every step of a form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A command the user can issue instead of answering the current prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormCommand {
    /// Go back to the previous step.
    Backup,
    /// Describe the possible responses.
    Help,
    /// Abandon the form.
    Quit,
    /// Start the form over.
    Reset,
    /// Summarize the values gathered so far.
    Status,
}

impl FormCommand {
    pub const ALL: [FormCommand; 5] = [
        FormCommand::Backup,
        FormCommand::Help,
        FormCommand::Quit,
        FormCommand::Reset,
        FormCommand::Status,
    ];
}

impl fmt::Display for FormCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormCommand::Backup => "backup",
            FormCommand::Help => "help",
            FormCommand::Quit => "quit",
            FormCommand::Reset => "reset",
            FormCommand::Status => "status",
        };
        write!(f, "{}", s)
    }
}
