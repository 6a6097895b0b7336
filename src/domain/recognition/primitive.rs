//! Whole-input recognizers for bool, text, numeric and date/time fields.

use chrono::{Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::Arc;

use super::{choice_hints, whole_input, MatchValue, Recognize, TermMatch, TermMatches};
use crate::domain::form::{FormConfiguration, PromptButton, TemplateUsage};
use crate::domain::foundation::FieldValue;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%B %d %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%B %d %Y", "%d %B %Y"];

/// The value type a primitive recognizer parses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveKind {
    Bool,
    Text,
    Integer { min: Option<i64>, max: Option<i64> },
    Double { min: Option<f64>, max: Option<f64> },
    DateTime,
}

/// Parses the entire sanitized input as a single value.
///
/// Text matches carry confidence 0.0 so a competing command wins when both
/// explain the input. Out-of-range numbers produce no match at all.
#[derive(Debug)]
pub struct RecognizePrimitive {
    kind: PrimitiveKind,
    optional: bool,
    configuration: Arc<FormConfiguration>,
    yes: Regex,
    no: Regex,
    no_preference: Regex,
    current_choice: Regex,
}

impl RecognizePrimitive {
    pub fn new(
        kind: PrimitiveKind,
        optional: bool,
        configuration: Arc<FormConfiguration>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            kind,
            optional,
            yes: whole_input(&configuration.yes)?,
            no: whole_input(&configuration.no)?,
            no_preference: whole_input(&configuration.no_preference)?,
            current_choice: whole_input(&configuration.current_choice)?,
            configuration,
        })
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    fn recognize(&self, input: &str, current: Option<&FieldValue>) -> Option<TermMatch> {
        let text = input.trim();
        let whole = |confidence: f64, value: MatchValue| TermMatch::new(0, input.len(), confidence, value);

        if self.optional && self.no_preference.is_match(text) {
            return Some(whole(1.0, MatchValue::NoValue));
        }
        if (text.is_empty() || self.current_choice.is_match(text)) && (current.is_some() || self.optional) {
            return Some(whole(1.0, current.cloned().into()));
        }

        let value = match self.kind {
            PrimitiveKind::Bool => {
                if self.yes.is_match(text) {
                    FieldValue::Bool(true)
                } else if self.no.is_match(text) {
                    FieldValue::Bool(false)
                } else {
                    return None;
                }
            }
            PrimitiveKind::Text => {
                if text.is_empty() {
                    return None;
                }
                let unquoted = text
                    .strip_prefix('"')
                    .and_then(|inner| inner.strip_suffix('"'))
                    .unwrap_or(text);
                return Some(whole(0.0, MatchValue::Value(FieldValue::Text(unquoted.to_string()))));
            }
            PrimitiveKind::Integer { min, max } => {
                let number = text.parse::<i64>().ok()?;
                if min.map_or(false, |min| number < min) || max.map_or(false, |max| number > max) {
                    return None;
                }
                FieldValue::Integer(number)
            }
            PrimitiveKind::Double { min, max } => {
                let number = text.parse::<f64>().ok().filter(|n| n.is_finite())?;
                if min.map_or(false, |min| number < min) || max.map_or(false, |max| number > max) {
                    return None;
                }
                FieldValue::Double(number)
            }
            PrimitiveKind::DateTime => FieldValue::DateTime(parse_date_time(text)?),
        };
        Some(whole(1.0, MatchValue::Value(value)))
    }

    fn limits_description(&self) -> String {
        fn describe<T: std::fmt::Display>(min: Option<T>, max: Option<T>) -> String {
            match (min, max) {
                (Some(min), Some(max)) => format!(" between {} and {}", min, max),
                (Some(min), None) => format!(" of at least {}", min),
                (None, Some(max)) => format!(" up to {}", max),
                (None, None) => String::new(),
            }
        }
        match self.kind {
            PrimitiveKind::Integer { min, max } => describe(min, max),
            PrimitiveKind::Double { min, max } => describe(min, max),
            _ => String::new(),
        }
    }
}

/// Parses relative words, then a fixed list of date/time and date formats.
pub(crate) fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    let now = Local::now().naive_local();
    let today = now.date();
    match text.to_lowercase().as_str() {
        "now" => return Some(now),
        "today" => return today.and_hms_opt(0, 0, 0),
        "tomorrow" => return today.succ_opt()?.and_hms_opt(0, 0, 0),
        "yesterday" => return today.pred_opt()?.and_hms_opt(0, 0, 0),
        _ => {}
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

impl Recognize for RecognizePrimitive {
    fn matches<'a>(&'a self, input: &'a str, current: Option<&'a FieldValue>) -> TermMatches<'a> {
        Box::new(self.recognize(input, current).into_iter())
    }

    fn values(&self) -> Vec<MatchValue> {
        match self.kind {
            PrimitiveKind::Bool => vec![
                MatchValue::Value(FieldValue::Bool(true)),
                MatchValue::Value(FieldValue::Bool(false)),
            ],
            _ => Vec::new(),
        }
    }

    fn value_description(&self, value: &MatchValue) -> String {
        match value {
            MatchValue::NoValue => self
                .configuration
                .template(TemplateUsage::NoPreference)
                .to_string(),
            MatchValue::Value(FieldValue::Bool(true)) => "Yes".to_string(),
            MatchValue::Value(FieldValue::Bool(false)) => "No".to_string(),
            MatchValue::Value(value) => value.to_string(),
            MatchValue::Command(command) => command.to_string(),
            MatchValue::Step(name) => name.clone(),
            MatchValue::FieldReference => String::new(),
        }
    }

    fn valid_inputs(&self, value: &MatchValue) -> Vec<String> {
        match value {
            MatchValue::Value(FieldValue::Bool(true)) => self.configuration.yes.clone(),
            MatchValue::Value(FieldValue::Bool(false)) => self.configuration.no.clone(),
            MatchValue::NoValue => self.configuration.no_preference.clone(),
            MatchValue::Value(value) => vec![regex::escape(&value.to_string())],
            _ => Vec::new(),
        }
    }

    fn help(&self, current: Option<&FieldValue>) -> String {
        let usage = match self.kind {
            PrimitiveKind::Bool => TemplateUsage::BoolHelp,
            PrimitiveKind::Text => TemplateUsage::StringHelp,
            PrimitiveKind::Integer { .. } => TemplateUsage::IntegerHelp,
            PrimitiveKind::Double { .. } => TemplateUsage::DoubleHelp,
            PrimitiveKind::DateTime => TemplateUsage::DateTimeHelp,
        };
        let current = current.map(|value| self.value_description(&MatchValue::Value(value.clone())));
        let hints = choice_hints(&self.configuration, current, self.optional);
        let limits = self.limits_description();
        crate::domain::form::render(
            self.configuration.template(usage),
            &[("current", hints.as_str()), ("limits", limits.as_str())],
        )
    }

    fn buttons(&self) -> Vec<PromptButton> {
        match self.kind {
            PrimitiveKind::Bool => vec![
                PromptButton::new("Yes", self.configuration.yes.first().cloned().unwrap_or_default()),
                PromptButton::new("No", self.configuration.no.first().cloned().unwrap_or_default()),
            ],
            _ => Vec::new(),
        }
    }
}
