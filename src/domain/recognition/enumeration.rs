//! Term and ordinal recognizer for enumerated values.
//!
//! Each candidate value compiles to one case-insensitive alternation over its
//! terms, longest first, plus an optional ordinal alternative. Two pseudo
//! values ride along: "current choice" (resolved to the field's current value)
//! and "no preference" (resolved to null for optional fields). Terms naming
//! the field itself yield the self-reference sentinel.

use regex::{Captures, Regex};
use std::sync::Arc;

use super::language::number_of_words;
use super::{choice_hints, MatchValue, Recognize, TermMatch, TermMatches};
use crate::domain::form::{render, FormConfiguration, PromptButton, TemplateUsage};
use crate::domain::foundation::FieldValue;

/// One selectable value with its description and matching terms.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumChoice {
    pub value: MatchValue,
    pub description: String,
    /// Regex fragments; the description itself is always accepted too.
    pub terms: Vec<String>,
}

impl EnumChoice {
    pub fn new(value: MatchValue, description: impl Into<String>, terms: Vec<String>) -> Self {
        Self {
            value,
            description: description.into(),
            terms,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnumerationOptions {
    /// Accept `1..n` as a selection of the n-th value.
    pub allow_numbers: bool,
    pub optional: bool,
    pub multiple: bool,
    /// Terms naming the field itself.
    pub field_terms: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ExpressionValue {
    CurrentChoice,
    Choice(usize),
    NoPreference,
    FieldReference,
}

#[derive(Debug)]
struct ValueExpression {
    value: ExpressionValue,
    expression: Regex,
    max_words: usize,
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Wraps a term in word boundaries when it starts and ends with a word
/// character. Spaces inside the term match any run of whitespace.
fn bounded(term: &str) -> String {
    let body = term.strip_suffix('?').unwrap_or(term);
    let starts = term.chars().next().map_or(false, is_word_char);
    let ends = body.chars().last().map_or(false, is_word_char);
    let pattern = term.replace(' ', r"\s+");
    if starts && ends {
        format!(r"\b(?:{})\b", pattern)
    } else {
        format!("(?:{})", pattern)
    }
}

fn build_expression(
    value: ExpressionValue,
    terms: &[String],
    ordinal: Option<usize>,
) -> Result<Option<ValueExpression>, regex::Error> {
    let mut sorted: Vec<&str> = Vec::new();
    for term in terms.iter().map(String::as_str).filter(|term| !term.is_empty()) {
        if !sorted.contains(&term) {
            sorted.push(term);
        }
    }
    sorted.sort_by(|a, b| b.len().cmp(&a.len()));
    let max_words = sorted
        .iter()
        .map(|term| number_of_words(term))
        .max()
        .unwrap_or(1)
        .max(1);
    let alternation: Vec<String> = sorted.iter().map(|term| bounded(term)).collect();
    let pattern = match (ordinal, alternation.is_empty()) {
        (Some(n), false) => format!(r"(?i)(?P<ordinal>\b{}\b)|{}", n, alternation.join("|")),
        (Some(n), true) => format!(r"(?i)(?P<ordinal>\b{}\b)", n),
        (None, false) => format!("(?i){}", alternation.join("|")),
        (None, true) => return Ok(None),
    };
    Ok(Some(ValueExpression {
        value,
        expression: Regex::new(&pattern)?,
        max_words,
    }))
}

/// Recognizer over a fixed set of values.
#[derive(Debug)]
pub struct RecognizeEnumeration {
    choices: Vec<EnumChoice>,
    expressions: Vec<ValueExpression>,
    options: EnumerationOptions,
    configuration: Arc<FormConfiguration>,
}

impl RecognizeEnumeration {
    pub fn new(
        choices: Vec<EnumChoice>,
        options: EnumerationOptions,
        configuration: Arc<FormConfiguration>,
    ) -> Result<Self, regex::Error> {
        let mut expressions = Vec::new();
        expressions.extend(build_expression(
            ExpressionValue::CurrentChoice,
            &configuration.current_choice,
            None,
        )?);
        for (index, choice) in choices.iter().enumerate() {
            let mut terms = choice.terms.clone();
            terms.push(regex::escape(&choice.description.to_lowercase()));
            let ordinal = options.allow_numbers.then_some(index + 1);
            expressions.extend(build_expression(ExpressionValue::Choice(index), &terms, ordinal)?);
        }
        if options.optional {
            let ordinal = options.allow_numbers.then_some(choices.len() + 1);
            expressions.extend(build_expression(
                ExpressionValue::NoPreference,
                &configuration.no_preference,
                ordinal,
            )?);
        }
        expressions.extend(build_expression(
            ExpressionValue::FieldReference,
            &options.field_terms,
            None,
        )?);
        Ok(Self {
            choices,
            expressions,
            options,
            configuration,
        })
    }

    pub fn choices(&self) -> &[EnumChoice] {
        &self.choices
    }

    fn term_match(
        &self,
        expression: &ValueExpression,
        captures: &Captures<'_>,
        current: Option<&FieldValue>,
    ) -> Option<TermMatch> {
        let whole = captures.get(0)?;
        if whole.as_str().is_empty() {
            return None;
        }
        let confidence = if captures.name("ordinal").is_some() {
            1.0
        } else {
            (number_of_words(whole.as_str()) as f64 / expression.max_words as f64).min(1.0)
        };
        let value = match expression.value {
            ExpressionValue::CurrentChoice => match current {
                Some(value) => MatchValue::Value(value.clone()),
                None if self.options.optional => MatchValue::NoValue,
                None => return None,
            },
            ExpressionValue::Choice(index) => self.choices.get(index)?.value.clone(),
            ExpressionValue::NoPreference => MatchValue::NoValue,
            ExpressionValue::FieldReference => MatchValue::FieldReference,
        };
        Some(TermMatch::new(whole.start(), whole.len(), confidence, value))
    }

    fn choice(&self, value: &MatchValue) -> Option<(usize, &EnumChoice)> {
        self.choices
            .iter()
            .enumerate()
            .find(|(_, choice)| &choice.value == value)
    }
}

impl Recognize for RecognizeEnumeration {
    fn matches<'a>(&'a self, input: &'a str, current: Option<&'a FieldValue>) -> TermMatches<'a> {
        if input.trim().is_empty() {
            let value = match current {
                Some(value) => Some(MatchValue::Value(value.clone())),
                None if self.options.optional => Some(MatchValue::NoValue),
                None => None,
            };
            return Box::new(
                value
                    .map(|value| TermMatch::new(0, input.len(), 1.0, value))
                    .into_iter(),
            );
        }
        Box::new(self.expressions.iter().flat_map(move |expression| {
            expression
                .expression
                .captures_iter(input)
                .filter_map(move |captures| self.term_match(expression, &captures, current))
        }))
    }

    fn values(&self) -> Vec<MatchValue> {
        self.choices.iter().map(|choice| choice.value.clone()).collect()
    }

    fn value_descriptions(&self) -> Vec<String> {
        self.choices
            .iter()
            .map(|choice| choice.description.clone())
            .collect()
    }

    fn value_description(&self, value: &MatchValue) -> String {
        if let Some((_, choice)) = self.choice(value) {
            return choice.description.clone();
        }
        match value {
            MatchValue::NoValue => self
                .configuration
                .template(TemplateUsage::NoPreference)
                .to_string(),
            MatchValue::Value(FieldValue::List(items)) => {
                let descriptions: Vec<String> = items
                    .iter()
                    .map(|item| self.value_description(&MatchValue::Value(item.clone())))
                    .collect();
                self.configuration.list(&descriptions)
            }
            MatchValue::Value(value) => value.to_string(),
            MatchValue::Command(command) => command.to_string(),
            MatchValue::Step(name) => name.clone(),
            MatchValue::FieldReference => String::new(),
        }
    }

    fn valid_inputs(&self, value: &MatchValue) -> Vec<String> {
        match self.choice(value) {
            Some((_, choice)) => {
                let mut inputs = choice.terms.clone();
                inputs.push(regex::escape(&choice.description.to_lowercase()));
                inputs
            }
            None if value.is_null() => self.configuration.no_preference.clone(),
            None => Vec::new(),
        }
    }

    fn help(&self, current: Option<&FieldValue>) -> String {
        let usage = if self.options.multiple {
            TemplateUsage::EnumManyHelp
        } else {
            TemplateUsage::EnumOneHelp
        };
        let numbers = if self.options.allow_numbers && !self.choices.is_empty() {
            format!("a number 1-{}, or ", self.choices.len())
        } else {
            String::new()
        };
        let choices = self.configuration.list(&self.value_descriptions());
        let current = current.map(|value| self.value_description(&MatchValue::Value(value.clone())));
        let hints = choice_hints(&self.configuration, current, self.options.optional);
        render(
            self.configuration.template(usage),
            &[
                ("numbers", numbers.as_str()),
                ("choices", choices.as_str()),
                ("current", hints.as_str()),
            ],
        )
    }

    fn buttons(&self) -> Vec<PromptButton> {
        let mut buttons: Vec<PromptButton> = self
            .choices
            .iter()
            .map(|choice| PromptButton::new(choice.description.clone(), choice.description.clone()))
            .collect();
        if self.options.optional {
            if let Some(term) = self.configuration.no_preference.first() {
                buttons.push(PromptButton::new(
                    self.configuration.template(TemplateUsage::NoPreference),
                    term.clone(),
                ));
            }
        }
        buttons
    }
}
