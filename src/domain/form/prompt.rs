//! Prompts sent to the user and the template renderer that builds them.

use serde::{Deserialize, Serialize};

/// A selectable option shown alongside a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptButton {
    pub title: String,
    /// Text sent back when the button is pressed.
    pub value: String,
}

impl PromptButton {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

/// Text plus optional buttons delivered to the channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPrompt {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<PromptButton>,
}

impl FormPrompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<PromptButton>) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.buttons.is_empty()
    }
}

/// Replaces `{name}` tokens in `pattern` with values from `args`.
///
/// Unknown tokens are left as written; `{{` and `}}` escape braces.
pub fn render(pattern: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(open) = rest.find(|c: char| c == '{' || c == '}') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }
        match tail.find('}') {
            Some(close) => {
                let name = &tail[1..close];
                match args.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&tail[..=close]),
                }
                rest = &tail[close + 1..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
