//! Recognition module - Turning free text into scored field values.
//!
//! # Module Organization
//!
//! - `term_match` - Candidate interpretations of input spans
//! - `language` - Word breaking, noise words and term generation
//! - `analyzer` - Coalescing, grouping and ranking of matches
//! - `primitive` - Whole-input recognizers for bool, text, numbers and dates
//! - `enumeration` - Term and ordinal recognizer for enumerated values

pub mod analyzer;
mod enumeration;
pub mod language;
mod primitive;
mod term_match;

pub use analyzer::{
    best_matches, coalesce, grouped_matches, highest_confidence, is_full_match, unmatched,
    MatchGroup,
};
pub use enumeration::{EnumChoice, EnumerationOptions, RecognizeEnumeration};
pub use primitive::{PrimitiveKind, RecognizePrimitive};
pub use term_match::{MatchValue, TermMatch};

use regex::Regex;
use std::fmt;

use crate::domain::form::{FormConfiguration, PromptButton, TemplateUsage};
use crate::domain::foundation::FieldValue;

/// Lazily produced matches for one input. Recomputed on every call.
pub type TermMatches<'a> = Box<dyn Iterator<Item = TermMatch> + 'a>;

/// Interprets input for one field.
pub trait Recognize: Send + Sync + fmt::Debug {
    /// Every interpretation of `input`, given the field's current value.
    fn matches<'a>(&'a self, input: &'a str, current: Option<&'a FieldValue>) -> TermMatches<'a>;

    /// Enumerable values, empty for open-ended kinds.
    fn values(&self) -> Vec<MatchValue> {
        Vec::new()
    }

    fn value_descriptions(&self) -> Vec<String> {
        self.values()
            .iter()
            .map(|value| self.value_description(value))
            .collect()
    }

    fn value_description(&self, value: &MatchValue) -> String;

    /// Regex fragments that select `value`.
    fn valid_inputs(&self, value: &MatchValue) -> Vec<String>;

    /// Description of the responses this recognizer accepts.
    fn help(&self, current: Option<&FieldValue>) -> String;

    /// Buttons offered with the prompt.
    fn buttons(&self) -> Vec<PromptButton> {
        Vec::new()
    }
}

fn first_term(terms: &[String]) -> &str {
    terms.first().map(String::as_str).unwrap_or("")
}

/// Help suffix describing the current-choice and no-preference shortcuts.
pub(crate) fn choice_hints(
    configuration: &FormConfiguration,
    current: Option<String>,
    optional: bool,
) -> String {
    let mut hint = String::new();
    if let Some(description) = current {
        hint.push_str(&format!(
            ", \"{}\" for {} ({})",
            first_term(&configuration.current_choice),
            configuration
                .template(TemplateUsage::CurrentChoice)
                .to_lowercase(),
            description
        ));
    }
    if optional {
        hint.push_str(&format!(
            ", \"{}\" for {}",
            first_term(&configuration.no_preference),
            configuration
                .template(TemplateUsage::NoPreference)
                .to_lowercase()
        ));
    }
    hint
}

/// Compiles terms into a case-insensitive regex that must match the whole input.
pub(crate) fn whole_input(terms: &[String]) -> Result<Regex, regex::Error> {
    let alternation: Vec<&str> = terms
        .iter()
        .map(String::as_str)
        .filter(|term| !term.is_empty())
        .collect();
    if alternation.is_empty() {
        return Regex::new("^__qqqq__$");
    }
    Regex::new(&format!(r"(?i)^\s*(?:{})\s*$", alternation.join("|")))
}
