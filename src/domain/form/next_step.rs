//! Directives describing where control flows after a step.

use serde::{Deserialize, Serialize};

/// Where to go once a step has been processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "direction", content = "names", rename_all = "snake_case")]
pub enum NextStep {
    /// The form is finished.
    Complete,
    /// The next active step that still needs input.
    #[default]
    Next,
    /// Back through the history.
    Previous,
    Quit,
    Reset,
    /// Go to the named step. More than one name asks the user to choose.
    Named(Vec<String>),
}

impl NextStep {
    pub fn named(name: impl Into<String>) -> Self {
        NextStep::Named(vec![name.into()])
    }

    /// Multi-name navigation the user must resolve.
    pub fn is_choice(&self) -> bool {
        matches!(self, NextStep::Named(names) if names.len() > 1)
    }
}
